pub mod accounts;
pub mod addendum;
pub mod banks;
pub mod classify;
pub mod entities;
pub mod import;
pub mod init;
pub mod report;
pub mod rules;
pub mod status;
pub mod transactions;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rentbooks",
    about = "Rule-based bookkeeping CLI for rental properties and small companies."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up rentbooks: choose a data directory and initialize the database.
    Init {
        /// Path for rentbooks data (default: ~/Documents/rentbooks)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Manage bank accounts.
    Accounts {
        #[command(subcommand)]
        command: AccountsCommands,
    },
    /// Manage bank statement formats.
    Banks {
        #[command(subcommand)]
        command: BanksCommands,
    },
    /// Manage rental properties.
    Properties {
        #[command(subcommand)]
        command: PropertiesCommands,
    },
    /// Manage companies.
    Companies {
        #[command(subcommand)]
        command: CompaniesCommands,
    },
    /// Manage property groups.
    Groups {
        #[command(subcommand)]
        command: GroupsCommands,
    },
    /// Manage owners.
    Owners {
        #[command(subcommand)]
        command: OwnersCommands,
    },
    /// Manage tax categories.
    TaxCategories {
        #[command(subcommand)]
        command: NameListCommands,
    },
    /// Manage transaction types.
    TransactionTypes {
        #[command(subcommand)]
        command: NameListCommands,
    },
    /// Import a bank statement CSV and classify the new transactions.
    Import {
        /// Path to the statement file
        file: String,
        /// Account name to import into
        #[arg(long)]
        account: String,
    },
    /// Re-run classification rules over imported transactions.
    Classify {
        /// Account name (default: every account)
        #[arg(long)]
        account: Option<String>,
    },
    /// Manage per-account classification rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Manage shared fallback rules that apply to every account.
    CommonRules {
        #[command(subcommand)]
        command: CommonRulesCommands,
    },
    /// Manage per-account defaults merged in when a common rule matches.
    Inherit {
        #[command(subcommand)]
        command: InheritCommands,
    },
    /// Manually enter, edit, or delete transactions.
    Addendum {
        #[command(subcommand)]
        command: AddendumCommands,
    },
    /// List transactions.
    Transactions {
        /// Filter by account name
        #[arg(long)]
        account: Option<String>,
        /// Filter by year: YYYY
        #[arg(long)]
        year: Option<i32>,
        /// Only show transactions no rule matched
        #[arg(long)]
        unclassified: bool,
    },
    /// Generate reports.
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Show current database and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum AccountsCommands {
    /// Add a bank account.
    Add {
        /// Account name, e.g. 'chase_checking'
        name: String,
        /// Bank format name (see `rentbooks banks list`)
        #[arg(long)]
        bank: String,
    },
    /// List all bank accounts.
    List,
}

#[derive(Subcommand)]
pub enum BanksCommands {
    /// Add a bank statement format.
    Add {
        /// Bank name, e.g. 'chase'
        name: String,
        /// Field delimiter
        #[arg(long, default_value = ",")]
        delimiter: String,
        /// Date format, e.g. MM/dd/yyyy
        #[arg(long = "date-format", default_value = "")]
        date_format: String,
        /// 1-based date column
        #[arg(long = "date-col")]
        date_col: usize,
        /// 1-based description column
        #[arg(long = "description-col")]
        description_col: usize,
        /// 1-based debit column (0 if the statement has none)
        #[arg(long = "debit-col", default_value = "0")]
        debit_col: usize,
        /// 1-based credit column (0 if the statement has none)
        #[arg(long = "credit-col", default_value = "0")]
        credit_col: usize,
        /// Drop raw lines starting with this prefix (repeatable)
        #[arg(long = "ignore-startswith")]
        ignore_startswith: Vec<String>,
        /// Drop raw lines containing this text (repeatable)
        #[arg(long = "ignore-contains")]
        ignore_contains: Vec<String>,
    },
    /// List all bank formats.
    List,
}

#[derive(Subcommand)]
pub enum PropertiesCommands {
    /// Add a rental property.
    Add {
        /// Property name, e.g. 'maple_st'
        name: String,
        /// Purchase cost
        #[arg(long, default_value = "0")]
        cost: f64,
        /// Land value portion of the cost
        #[arg(long = "land-value", default_value = "0")]
        land_value: f64,
        /// Capitalized renovation cost
        #[arg(long, default_value = "0")]
        renovation: f64,
        /// Loan closing cost
        #[arg(long = "loan-closing-cost", default_value = "0")]
        loan_closing_cost: f64,
        /// Number of owners
        #[arg(long = "owner-count", default_value = "1")]
        owner_count: i64,
        /// Purchase date: YYYY-MM-DD
        #[arg(long = "purchase-date", default_value = "")]
        purchase_date: String,
        /// Management company name
        #[arg(long = "mgmt-company", default_value = "")]
        mgmt_company: String,
    },
    /// List all properties.
    List,
    /// Delete a property.
    Delete {
        /// Property name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum CompaniesCommands {
    /// Add a company.
    Add {
        /// Company name, e.g. 'acme_llc'
        name: String,
        /// Percentage of rent the company collects
        #[arg(long = "rent-percentage", default_value = "0")]
        rent_percentage: i64,
    },
    /// List all companies.
    List,
    /// Delete a company.
    Delete {
        /// Company name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum GroupsCommands {
    /// Add a property group.
    Add {
        /// Group name, e.g. 'downtown'
        name: String,
        /// Comma-separated property names
        #[arg(long)]
        properties: String,
    },
    /// List all groups.
    List,
    /// Delete a group.
    Delete {
        /// Group name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum OwnersCommands {
    /// Add an owner.
    Add {
        /// Owner name
        name: String,
        /// Comma-separated bank account names
        #[arg(long, default_value = "")]
        accounts: String,
        /// Comma-separated property names
        #[arg(long, default_value = "")]
        properties: String,
        /// Comma-separated company names
        #[arg(long, default_value = "")]
        companies: String,
    },
    /// List all owners.
    List,
    /// Delete an owner.
    Delete {
        /// Owner name
        name: String,
    },
}

/// Shared add/list shape for the simple name tables.
#[derive(Subcommand)]
pub enum NameListCommands {
    /// Add a name.
    Add { name: String },
    /// List all names.
    List,
}

#[derive(Subcommand)]
pub enum RulesCommands {
    /// Add a rule, shifting later rules down when the slot is taken.
    Add {
        /// Account name
        #[arg(long)]
        account: String,
        /// Pattern, e.g. 'desc_contains=ACME PROPERTY'
        #[arg(long)]
        pattern: String,
        /// Transaction type to assign
        #[arg(long = "type")]
        transaction_type: String,
        /// Tax category: personal, rental, or company
        #[arg(long)]
        tax: String,
        /// Property name (rental rules)
        #[arg(long, default_value = "")]
        property: String,
        /// Property group name (rental rules)
        #[arg(long, default_value = "")]
        group: String,
        /// Company name (company rules)
        #[arg(long, default_value = "")]
        company: String,
        /// Free-form counterparty
        #[arg(long = "other-entity", default_value = "")]
        other_entity: String,
        /// Free-form comment
        #[arg(long, default_value = "")]
        comment: String,
        /// Position in the match order (default: append at the end)
        #[arg(long)]
        order: Option<i64>,
    },
    /// List an account's rules in match order.
    List {
        /// Account name
        #[arg(long)]
        account: String,
    },
    /// Move a rule to a new position.
    Move {
        /// Account name
        #[arg(long)]
        account: String,
        /// Current position
        current: i64,
        /// New position
        new: i64,
    },
    /// Delete a rule by position.
    Delete {
        /// Account name
        #[arg(long)]
        account: String,
        /// Position of the rule to delete
        order: i64,
    },
}

#[derive(Subcommand)]
pub enum CommonRulesCommands {
    /// Add a shared fallback rule.
    Add {
        /// Pattern, e.g. 'desc_contains=INTEREST PAYMENT'
        pattern: String,
        /// Transaction type to assign
        #[arg(long = "type")]
        transaction_type: String,
    },
    /// List all shared fallback rules.
    List,
    /// Delete a shared fallback rule.
    Delete {
        /// Pattern of the rule to delete
        pattern: String,
        /// Transaction type of the rule to delete
        #[arg(long = "type")]
        transaction_type: String,
    },
}

#[derive(Subcommand)]
pub enum InheritCommands {
    /// Set (or replace) an account's defaults.
    Set {
        /// Account name
        #[arg(long)]
        account: String,
        /// Default tax category
        #[arg(long, default_value = "")]
        tax: String,
        /// Default property
        #[arg(long, default_value = "")]
        property: String,
        /// Default property group
        #[arg(long, default_value = "")]
        group: String,
        /// Default counterparty
        #[arg(long = "other-entity", default_value = "")]
        other_entity: String,
    },
    /// List defaults for every account.
    List,
    /// Delete an account's defaults.
    Delete {
        /// Account name
        #[arg(long)]
        account: String,
    },
}

#[derive(Subcommand)]
pub enum AddendumCommands {
    /// Manually enter a transaction.
    Add {
        /// Account name
        #[arg(long)]
        account: String,
        /// Date: YYYY-MM-DD
        #[arg(long)]
        date: String,
        /// Description
        #[arg(long)]
        description: String,
        /// Amount (negative for money out)
        #[arg(long)]
        credit: f64,
    },
    /// Edit a manually entered transaction.
    Edit {
        /// Transaction ID (shown in `rentbooks transactions`)
        id: i64,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        credit: Option<f64>,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long = "type")]
        transaction_type: Option<String>,
        #[arg(long)]
        tax: Option<String>,
        #[arg(long)]
        property: Option<String>,
        #[arg(long)]
        group: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long = "other-entity")]
        other_entity: Option<String>,
    },
    /// Delete a manually entered transaction.
    Delete {
        /// Transaction ID (shown in `rentbooks transactions`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Per-property rental totals by transaction type, with depreciation.
    Rental {
        /// Report year (default: settings report_year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Per-company totals by transaction type.
    Company {
        /// Report year (default: settings report_year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Month-by-month rent received per property.
    RentTracker {
        /// Report year (default: settings report_year)
        #[arg(long)]
        year: Option<i32>,
    },
}
