mod addendum;
mod classifier;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod models;
mod pattern;
mod reports;
mod rules;
mod settings;

use clap::Parser;

use cli::{
    AccountsCommands, AddendumCommands, BanksCommands, Cli, Commands, CommonRulesCommands,
    CompaniesCommands, GroupsCommands, InheritCommands, NameListCommands, OwnersCommands,
    PropertiesCommands, ReportCommands, RulesCommands,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Accounts { command } => match command {
            AccountsCommands::Add { name, bank } => cli::accounts::add(&name, &bank),
            AccountsCommands::List => cli::accounts::list(),
        },
        Commands::Banks { command } => match command {
            BanksCommands::Add {
                name,
                delimiter,
                date_format,
                date_col,
                description_col,
                debit_col,
                credit_col,
                ignore_startswith,
                ignore_contains,
            } => cli::banks::add(
                &name,
                &delimiter,
                &date_format,
                date_col,
                description_col,
                debit_col,
                credit_col,
                &ignore_startswith,
                &ignore_contains,
            ),
            BanksCommands::List => cli::banks::list(),
        },
        Commands::Properties { command } => match command {
            PropertiesCommands::Add {
                name,
                cost,
                land_value,
                renovation,
                loan_closing_cost,
                owner_count,
                purchase_date,
                mgmt_company,
            } => cli::entities::property_add(
                &name,
                cost,
                land_value,
                renovation,
                loan_closing_cost,
                owner_count,
                &purchase_date,
                &mgmt_company,
            ),
            PropertiesCommands::List => cli::entities::property_list(),
            PropertiesCommands::Delete { name } => cli::entities::property_delete(&name),
        },
        Commands::Companies { command } => match command {
            CompaniesCommands::Add {
                name,
                rent_percentage,
            } => cli::entities::company_add(&name, rent_percentage),
            CompaniesCommands::List => cli::entities::company_list(),
            CompaniesCommands::Delete { name } => cli::entities::company_delete(&name),
        },
        Commands::Groups { command } => match command {
            GroupsCommands::Add { name, properties } => {
                cli::entities::group_add(&name, &properties)
            }
            GroupsCommands::List => cli::entities::group_list(),
            GroupsCommands::Delete { name } => cli::entities::group_delete(&name),
        },
        Commands::Owners { command } => match command {
            OwnersCommands::Add {
                name,
                accounts,
                properties,
                companies,
            } => cli::entities::owner_add(&name, &accounts, &properties, &companies),
            OwnersCommands::List => cli::entities::owner_list(),
            OwnersCommands::Delete { name } => cli::entities::owner_delete(&name),
        },
        Commands::TaxCategories { command } => match command {
            NameListCommands::Add { name } => cli::entities::name_add("tax_categories", &name),
            NameListCommands::List => cli::entities::name_list("tax_categories"),
        },
        Commands::TransactionTypes { command } => match command {
            NameListCommands::Add { name } => {
                cli::entities::name_add("transaction_types", &name)
            }
            NameListCommands::List => cli::entities::name_list("transaction_types"),
        },
        Commands::Import { file, account } => cli::import::run(&file, &account),
        Commands::Classify { account } => cli::classify::run(account.as_deref()),
        Commands::Rules { command } => match command {
            RulesCommands::Add {
                account,
                pattern,
                transaction_type,
                tax,
                property,
                group,
                company,
                other_entity,
                comment,
                order,
            } => cli::rules::add(
                &account,
                &pattern,
                &transaction_type,
                &tax,
                &property,
                &group,
                &company,
                &other_entity,
                &comment,
                order,
            ),
            RulesCommands::List { account } => cli::rules::list(&account),
            RulesCommands::Move {
                account,
                current,
                new,
            } => cli::rules::move_rule(&account, current, new),
            RulesCommands::Delete { account, order } => cli::rules::delete(&account, order),
        },
        Commands::CommonRules { command } => match command {
            CommonRulesCommands::Add {
                pattern,
                transaction_type,
            } => cli::rules::common_add(&pattern, &transaction_type),
            CommonRulesCommands::List => cli::rules::common_list(),
            CommonRulesCommands::Delete {
                pattern,
                transaction_type,
            } => cli::rules::common_delete(&pattern, &transaction_type),
        },
        Commands::Inherit { command } => match command {
            InheritCommands::Set {
                account,
                tax,
                property,
                group,
                other_entity,
            } => cli::rules::inherit_set(&account, &tax, &property, &group, &other_entity),
            InheritCommands::List => cli::rules::inherit_list(),
            InheritCommands::Delete { account } => cli::rules::inherit_delete(&account),
        },
        Commands::Addendum { command } => match command {
            AddendumCommands::Add {
                account,
                date,
                description,
                credit,
            } => cli::addendum::add(&account, &date, &description, credit),
            AddendumCommands::Edit {
                id,
                date,
                description,
                credit,
                comment,
                transaction_type,
                tax,
                property,
                group,
                company,
                other_entity,
            } => cli::addendum::edit(
                id,
                date,
                description,
                credit,
                comment,
                transaction_type,
                tax,
                property,
                group,
                company,
                other_entity,
            ),
            AddendumCommands::Delete { id } => cli::addendum::delete(id),
        },
        Commands::Transactions {
            account,
            year,
            unclassified,
        } => cli::transactions::list(account.as_deref(), year, unclassified),
        Commands::Report { command } => match command {
            ReportCommands::Rental { year } => cli::report::rental(year),
            ReportCommands::Company { year } => cli::report::company(year),
            ReportCommands::RentTracker { year } => cli::report::tracker(year),
        },
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
