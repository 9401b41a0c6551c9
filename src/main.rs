use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;

// Import from our library
use donotscan::config::load_config;
use donotscan::notify::create_notifier;
use donotscan::output::{format_rule_detail, format_rule_table};
use donotscan::rules::{Criterion, NewRule, Rule, RuleEngine, RuleStore};

#[derive(Parser)]
#[command(name = "donotscan")]
#[command(about = "Manage the do-not-scan exemption list")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List exemption rules
    List {
        /// Include inactive rules
        #[arg(long)]
        all: bool,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
    /// Search rules by field=value criteria (AND across criteria)
    Search {
        /// Criteria, e.g. ticket=SEC-1234 application=Payroll
        criteria: Vec<String>,

        /// Output format
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
    /// Create a new exemption rule
    New {
        /// Pattern to exclude from scanning
        #[arg(long)]
        pattern: String,

        /// Ticket number backing the exemption
        #[arg(long)]
        ticket: Option<String>,

        /// Requester name
        #[arg(long)]
        name: Option<String>,

        /// Requester email
        #[arg(long)]
        email: Option<String>,

        /// Application the exemption covers
        #[arg(long)]
        application: Option<String>,

        /// Reason for the exemption
        #[arg(long)]
        reason: Option<String>,

        /// Expiration date (YYYY-MM-DD); defaults to 14 days out, or
        /// December 31 for permanent rules
        #[arg(long)]
        expires: Option<String>,

        /// Permanent rule, renewed through the annual true-up
        #[arg(long)]
        permanent: bool,
    },
    /// Show one rule with its full activity trail
    Show { id: u64 },
    /// Re-enable a rule
    Activate { id: u64 },
    /// Disable a rule
    Deactivate { id: u64 },
    /// Renew a permanent rule for the next annual period
    Trueup { id: u64 },
    /// Generate the do-not-scan list consumed by scanning tooling
    Generate {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Send annual audit requests for all permanent rules
    Audit,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config()?;
    init_logging(cli.verbose || config.debug);

    let store = RuleStore::open(&config.store_path);
    let notifier = create_notifier(config.mail.clone());
    let engine = RuleEngine::new(store, notifier);

    match cli.command {
        Commands::List { all, format } => handle_list(&engine, all, format),
        Commands::Search { criteria, format } => handle_search(&engine, &criteria, format),
        Commands::New {
            pattern,
            ticket,
            name,
            email,
            application,
            reason,
            expires,
            permanent,
        } => handle_new(
            &engine,
            NewRuleArgs {
                pattern,
                ticket,
                name,
                email,
                application,
                reason,
                expires,
                permanent,
            },
        ),
        Commands::Show { id } => {
            let rule = engine.get_rule(id)?;
            print!("{}", format_rule_detail(&rule));
            Ok(())
        }
        Commands::Activate { id } => {
            let rule = engine.activate(id)?;
            println!("Rule {} activated", rule.id);
            Ok(())
        }
        Commands::Deactivate { id } => {
            let rule = engine.deactivate(id)?;
            println!("Rule {} deactivated", rule.id);
            Ok(())
        }
        Commands::Trueup { id } => {
            let rule = engine.true_up(id)?;
            println!(
                "Rule {} renewed through {}",
                rule.id,
                rule.expiration.format("%Y-%m-%d")
            );
            Ok(())
        }
        Commands::Generate { output } => handle_generate(&engine, output),
        Commands::Audit => {
            let rules = engine.rule_audit()?;
            println!("Audit requests issued for {} permanent rule(s)", rules.len());
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "donotscan=debug"
    } else {
        "donotscan=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

struct NewRuleArgs {
    pattern: String,
    ticket: Option<String>,
    name: Option<String>,
    email: Option<String>,
    application: Option<String>,
    reason: Option<String>,
    expires: Option<String>,
    permanent: bool,
}

fn handle_new(engine: &RuleEngine, args: NewRuleArgs) -> Result<()> {
    let expiration = args
        .expires
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("Invalid expiration date '{}', expected YYYY-MM-DD", raw))
        })
        .transpose()?;

    let rule = engine.add_rule(NewRule {
        pattern: args.pattern,
        ticket: args.ticket,
        requester_name: args.name,
        requester_email: args.email,
        application: args.application,
        reason: args.reason,
        expiration,
        permanent: args.permanent,
    })?;

    println!(
        "Created rule {} ({}), expires {}",
        rule.id,
        rule.pattern,
        rule.expiration.format("%Y-%m-%d")
    );
    Ok(())
}

fn handle_list(engine: &RuleEngine, all: bool, format: Option<OutputFormat>) -> Result<()> {
    let rules = engine.list_rules(true, all)?;
    print_rules(&rules, format)
}

fn handle_search(engine: &RuleEngine, criteria: &[String], format: Option<OutputFormat>) -> Result<()> {
    let criteria = criteria
        .iter()
        .map(|raw| Criterion::parse(raw))
        .collect::<donotscan::Result<Vec<_>>>()?;

    let rules = engine.search_rules(&criteria)?;
    print_rules(&rules, format)
}

fn print_rules(rules: &[Rule], format: Option<OutputFormat>) -> Result<()> {
    match format.unwrap_or(OutputFormat::Table) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rules)?),
        OutputFormat::Table => print!("{}", format_rule_table(rules)),
    }
    Ok(())
}

fn handle_generate(engine: &RuleEngine, output: Option<PathBuf>) -> Result<()> {
    let list = engine.generate_exemption_list()?;

    match output {
        Some(path) => fs::write(&path, &list)
            .with_context(|| format!("Failed to write exemption list: {}", path.display()))?,
        // The raw artifact, one pattern per line, no header.
        None => print!("{}", list),
    }

    Ok(())
}
