use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use tracing_subscriber::EnvFilter;

use smart_travel::account::ProfileUpdate;
use smart_travel::budget::check_budget;
use smart_travel::collaborators::CollaboratorLoader;
use smart_travel::constants::*;
use smart_travel::currency::format_amount;
use smart_travel::expenses::{BudgetStatus, ExpenseDraft, ExpenseLog};
use smart_travel::models::{ExpenseCategory, ExpenseId, TravelerType, TripId};
use smart_travel::recommendation::{RecommendationInputs, RecommendationTracker, refresh};
use smart_travel::trips::TripList;
use smart_travel::utils::{format_date, parse_date, today};
use smart_travel::{Account, ApiClient, ClientError, Config, SessionStore};

const USAGE: &str = "\
Usage: smart-travel <command> [args]

Commands:
  login <email> <password>
  logout
  trips
  recommend <city> <budget|medium|luxury> <start> <end>
  check-budget <city> <budget|medium|luxury> <start> <end> <amount>
  collaborators <trip-id>
  delete-trip <trip-id> --yes
  expenses <trip-id>
  add-expense <trip-id> <amount> <category> [date] [description]
  delete-expense <expense-id> --yes
  set-currency <code>
  delete-account --yes

Dates use YYYY-MM-DD; an expense without a date is logged for today.";

#[derive(Debug, PartialEq)]
enum Command {
    Login { email: String, password: String },
    Logout,
    Trips,
    Recommend(RecommendationInputs),
    CheckBudget(RecommendationInputs, f64),
    Collaborators(TripId),
    DeleteTrip { trip_id: TripId, confirmed: bool },
    Expenses(TripId),
    AddExpense(ExpenseDraft),
    DeleteExpense { expense_id: ExpenseId, confirmed: bool },
    SetCurrency(String),
    DeleteAccount { confirmed: bool },
}

fn parse_command(args: &[String]) -> Result<Command> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        ["login", email, password] => Ok(Command::Login {
            email: email.to_string(),
            password: password.to_string(),
        }),
        ["logout"] => Ok(Command::Logout),
        ["trips"] => Ok(Command::Trips),
        ["recommend", city, tier, start, end] => {
            Ok(Command::Recommend(parse_inputs(city, tier, start, end)?))
        }
        ["check-budget", city, tier, start, end, amount] => {
            let amount: f64 = amount
                .parse()
                .map_err(|_| anyhow!("invalid amount '{}'", amount))?;
            Ok(Command::CheckBudget(
                parse_inputs(city, tier, start, end)?,
                amount,
            ))
        }
        ["collaborators", trip_id] => Ok(Command::Collaborators(parse_trip_id(trip_id)?)),
        ["delete-trip", trip_id, rest @ ..] => Ok(Command::DeleteTrip {
            trip_id: parse_trip_id(trip_id)?,
            confirmed: rest.contains(&"--yes"),
        }),
        ["expenses", trip_id] => Ok(Command::Expenses(parse_trip_id(trip_id)?)),
        ["add-expense", trip_id, amount, category, rest @ ..] => {
            let (date, words) = match rest {
                [first, words @ ..] if parse_date(first).is_some() => (parse_date(first), words),
                words => (None, words),
            };
            Ok(Command::AddExpense(ExpenseDraft {
                trip: Some(parse_trip_id(trip_id)?),
                amount: amount
                    .parse()
                    .map_err(|_| anyhow!("invalid amount '{}'", amount))?,
                date: Some(date.unwrap_or_else(today)),
                category: category
                    .parse::<ExpenseCategory>()
                    .map_err(|e| anyhow!(e))?,
                description: words.join(" "),
                ..ExpenseDraft::default()
            }))
        }
        ["delete-expense", expense_id, rest @ ..] => Ok(Command::DeleteExpense {
            expense_id: expense_id
                .parse()
                .map_err(|_| anyhow!("invalid expense id '{}'", expense_id))?,
            confirmed: rest.contains(&"--yes"),
        }),
        ["set-currency", code] => Ok(Command::SetCurrency(code.to_uppercase())),
        ["delete-account", rest @ ..] => Ok(Command::DeleteAccount {
            confirmed: rest.contains(&"--yes"),
        }),
        _ => bail!("{}", USAGE),
    }
}

fn parse_inputs(city: &str, tier: &str, start: &str, end: &str) -> Result<RecommendationInputs> {
    let traveler_type: TravelerType = tier.parse().map_err(|e: String| anyhow!(e))?;
    Ok(RecommendationInputs {
        destination: city.to_string(),
        traveler_type: Some(traveler_type),
        start_date: Some(parse_day(start)?),
        end_date: Some(parse_day(end)?),
    })
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    parse_date(value).ok_or_else(|| anyhow!("invalid date '{}', expected YYYY-MM-DD", value))
}

fn parse_trip_id(value: &str) -> Result<TripId> {
    value
        .parse()
        .map_err(|_| anyhow!("invalid trip id '{}'", value))
}

/// Turn a client error into the line printed for the user.
fn failure(err: ClientError, fallback: &str) -> anyhow::Error {
    match err {
        ClientError::ConfirmationRequired(prompt) => {
            anyhow!("{} Re-run with --yes to confirm.", prompt)
        }
        other => anyhow!(other.user_message(fallback)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    let config = Config::from_env().context("Configuration error")?;
    let api = ApiClient::from_config(&config)?;
    let mut account = Account::new(api, SessionStore::new(config.session_file()));
    let logged_in = account.restore(Utc::now()).await?;

    match command {
        Command::Login { email, password } => {
            let session = account.login(&email, &password).await?;
            match &session.profile {
                Some(profile) => println!("Logged in as {}", profile.email),
                None => println!("Logged in"),
            }
        }
        Command::Logout => {
            account.logout().await?;
            println!("Logged out");
        }
        _ if !logged_in => bail!(ERR_NOT_LOGGED_IN),
        Command::Trips => {
            let result = TripList::load(account.api()).await;
            let trips = account.guard(result).await?;
            if trips.is_empty() {
                println!("No trips yet");
            }
            for trip in trips.trips() {
                println!(
                    "{:>5}  {:<24} {:<12} {} to {}  {}",
                    trip.id,
                    trip.trip_name,
                    trip.destination,
                    format_date(trip.start_date),
                    format_date(trip.end_date),
                    format_amount(trip.total_budget, account.currency())
                );
            }
        }
        Command::Recommend(inputs) => {
            let mut tracker = RecommendationTracker::new(config.duration_policy());
            let Some(rec) = refresh(&mut tracker, account.api(), &inputs).await.cloned() else {
                bail!("No recommendation available for these inputs");
            };
            println!(
                "Recommended: {}",
                format_amount(rec.total_budget, &rec.currency)
            );
            for (category, amount) in &rec.daily_breakdown {
                println!("  {:<16} {}/day", category, format_amount(*amount, &rec.currency));
            }
        }
        Command::CheckBudget(inputs, amount) => {
            let mut tracker = RecommendationTracker::new(config.duration_policy());
            let rec = refresh(&mut tracker, account.api(), &inputs).await.cloned();
            let check = check_budget(amount, rec.as_ref());
            if let Some(band) = &check.band {
                println!("Accepted range: {}", band.range_label());
            }
            match check.message {
                Some(message) => bail!(message),
                None => println!("Budget OK"),
            }
        }
        Command::Collaborators(trip_id) => {
            let mut loader = CollaboratorLoader::new();
            let result = loader.load(account.api(), trip_id).await;
            let Some(result) = result else {
                return Ok(());
            };
            let collaborators = account.guard(result).await?;
            if collaborators.is_empty() {
                println!("No collaborators");
            }
            for c in collaborators.entries() {
                println!("{}  <{}>", c.display_name(), c.email);
            }
        }
        Command::DeleteTrip { trip_id, confirmed } => {
            let result = TripList::load(account.api()).await;
            let mut trips = account.guard(result).await?;
            let result = trips.delete(account.api(), trip_id, confirmed).await;
            account
                .guard(result)
                .await
                .map_err(|e| failure(e, ERR_DELETE_TRIP))?;
            println!("Trip {} deleted", trip_id);
        }
        Command::Expenses(trip_id) => {
            let result = TripList::load(account.api()).await;
            let trips = account.guard(result).await?;
            let Some(trip) = trips.get(trip_id) else {
                bail!("Trip {} not found", trip_id);
            };
            let result = ExpenseLog::load(account.api()).await;
            let log = account.guard(result).await?;
            let status = BudgetStatus::for_trip(trip, &log);
            println!(
                "{}: spent {} of {}, {} left",
                trip.trip_name,
                format_amount(status.spent, &trip.currency),
                format_amount(status.total_budget, &trip.currency),
                format_amount(status.remaining, &trip.currency)
            );
            if status.is_over_budget() {
                println!("Over budget");
            }
            for expense in log.for_trip(trip_id) {
                println!(
                    "{:>5}  {}  {:<14} {:>12}  {}",
                    expense.id,
                    format_date(expense.date),
                    expense.category.as_str(),
                    format_amount(expense.amount, &expense.original_currency),
                    expense.description.as_deref().unwrap_or("")
                );
            }
        }
        Command::AddExpense(draft) => {
            let result = TripList::load(account.api()).await;
            let trips = account.guard(result).await?;
            let result = ExpenseLog::load(account.api()).await;
            let mut log = account.guard(result).await?;
            let result = log.submit(account.api(), &draft, &trips, today()).await;
            let expense = account
                .guard(result)
                .await
                .map_err(|e| failure(e, ERR_SUBMIT_EXPENSE))?;
            println!(
                "Expense {} logged for {}",
                expense.id,
                format_date(expense.date)
            );
        }
        Command::DeleteExpense {
            expense_id,
            confirmed,
        } => {
            let mut log = ExpenseLog::default();
            let result = log.delete(account.api(), expense_id, confirmed).await;
            account
                .guard(result)
                .await
                .map_err(|e| failure(e, ERR_DELETE_EXPENSE))?;
            println!("Expense {} deleted", expense_id);
        }
        Command::SetCurrency(code) => {
            let profile = account.refresh_profile().await?;
            let update = ProfileUpdate {
                currency: code,
                ..ProfileUpdate::from_profile(&profile)
            };
            let profile = account
                .update_profile(&update)
                .await
                .map_err(|e| failure(e, ERR_SAVE_SETTINGS))?;
            println!("Currency set to {}", profile.currency);
        }
        Command::DeleteAccount { confirmed } => {
            account
                .delete_account(confirmed)
                .await
                .map_err(|e| failure(e, ERR_DELETE_ACCOUNT))?;
            println!("Account deleted");
        }
    }

    Ok(())
}
