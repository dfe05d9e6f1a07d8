use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use compat_backend::adapters::documents_sea::SeaDocumentStore;
use compat_backend::auth::StaticIdentity;
use compat_backend::config::app::AppConfig;
use compat_backend::domain::{Comment, TestReport};
use compat_backend::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use compat_backend::infra::db::connect_db;
use compat_backend::repos::codec::StoredDoc;
use compat_backend::repos::{comments, reports};
use compat_backend::services::catalog::load_game;
use compat_backend::services::{moderation, BanList, ContentKind, Moderated, PagedQueryCursor};
use compat_backend::state::Session;
use compat_backend::store::DocumentStore;
use compat_backend::utils::clock::format_millis;
use compat_backend::AppError;
use migration::{migrate, MigrationCommand};
use tracing::error;

mod telemetry;

#[derive(Clone, Copy, ValueEnum)]
enum LogArg {
    Json,
    Pretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum MigrateArg {
    Up,
    Down,
    Fresh,
    Reset,
    Status,
}

#[derive(Parser)]
#[command(name = "compat-admin")]
#[command(about = "Game compatibility tracker: catalog queries and moderation")]
struct Cli {
    /// Act as this email (defaults to COMPAT_ACTOR_EMAIL)
    #[arg(long = "as", global = true)]
    actor: Option<String>,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value = "pretty", global = true)]
    log: LogArg,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct PageArgs {
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Run database migrations
    Migrate {
        #[arg(value_enum, default_value = "up")]
        command: MigrateArg,
    },
    /// Show a game's aggregate status and its latest report
    Status { game_id: String },
    /// List test reports, newest first
    Tests {
        #[command(flatten)]
        paging: PageArgs,
        /// Only reports of this game
        #[arg(long)]
        game: Option<String>,
    },
    /// List comments of one kind, newest first
    Comments {
        kind: String,
        #[command(flatten)]
        paging: PageArgs,
        /// Only comments on this test or game
        #[arg(long)]
        parent: Option<String>,
    },
    /// Archive a test report
    Archive { test_id: String },
    /// Unarchive a test report
    Unarchive { test_id: String },
    /// Delete a test report or comment
    Delete { kind: String, id: String },
    /// Overwrite a whole document with a JSON object
    EditRaw { kind: String, id: String, json: String },
    /// Replace a comment's text
    EditText { kind: String, id: String, text: String },
    /// Maintain the ban list
    Ban {
        #[command(subcommand)]
        action: BanAction,
    },
}

#[derive(Subcommand)]
enum BanAction {
    Add { email: String },
    Remove { email: String },
    List,
    /// Replace the whole list
    Set { emails: Vec<String> },
}

/// Either kind of moderated item, loaded from the store.
enum Item {
    Test(TestReport),
    Comment(Comment),
}

impl moderation::Moderatable for Item {
    fn doc_id(&self) -> &str {
        match self {
            Item::Test(t) => &t.id,
            Item::Comment(c) => &c.id,
        }
    }

    fn is_archived(&self) -> bool {
        matches!(self, Item::Test(t) if t.archived)
    }
}

async fn load_item(store: &dyn DocumentStore, kind: ContentKind, id: &str) -> Result<Item, AppError> {
    let item = if kind.is_comment() {
        comments::find_comment(store, kind.collection(), id)
            .await?
            .map(Item::Comment)
    } else {
        reports::find_report(store, id).await?.map(|v| Item::Test(v.value))
    };
    item.ok_or_else(|| {
        let what = if kind.is_comment() {
            NotFoundKind::Comment
        } else {
            NotFoundKind::TestReport
        };
        DomainError::not_found(what, format!("{kind}/{id} not found")).into()
    })
}

async fn load_test(store: &dyn DocumentStore, id: &str) -> Result<TestReport, AppError> {
    match load_item(store, ContentKind::Tests, id).await? {
        Item::Test(report) => Ok(report),
        Item::Comment(_) => Err(AppError::internal("expected a test report")),
    }
}

fn print_test(report: &TestReport) {
    let archived = if report.archived { " [archived]" } else { "" };
    println!(
        "{}  {}  game={}  {}{}",
        report.id,
        format_millis(report.updated_at_millis),
        report.game_id,
        report.summary(),
        archived
    );
}

fn print_comment(comment: &Comment) {
    let edited = if comment.is_edited() { " (edited)" } else { "" };
    println!(
        "{}  {}  on={}  {}: {}{}",
        comment.id,
        format_millis(comment.created_at_millis),
        comment.parent_id,
        comment
            .author_name
            .as_deref()
            .or(comment.author_email.as_deref())
            .unwrap_or("anonymous"),
        comment.text,
        edited
    );
}

/// Print the outcome of an admin-gated command.
fn report_outcome<T>(outcome: Moderated<T>, on_done: impl FnOnce(T)) {
    match outcome {
        Moderated::Done(value) => on_done(value),
        Moderated::NoAccess(access) => println!("no effect: {access}"),
    }
}

/// Walk the cursor to the requested page and return its items.
async fn nth_page<T: StoredDoc>(
    cursor: &PagedQueryCursor<T>,
    page: usize,
) -> Result<(Vec<T>, bool), AppError> {
    let mut current = cursor.fetch_first_page().await?.into_page();
    for _ in 1..page.max(1) {
        if !current.as_ref().is_some_and(|p| p.has_more) {
            return Ok((Vec::new(), false));
        }
        current = cursor.fetch_next_page().await?.into_page();
    }
    Ok(current.map(|p| (p.items, p.has_more)).unwrap_or_default())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let conn = connect_db(config.require_database_url()?).await?;

    if let Command::Migrate { command } = cli.command {
        let command = match command {
            MigrateArg::Up => MigrationCommand::Up,
            MigrateArg::Down => MigrationCommand::Down,
            MigrateArg::Fresh => MigrationCommand::Fresh,
            MigrateArg::Reset => MigrationCommand::Reset,
            MigrateArg::Status => MigrationCommand::Status,
        };
        migrate(&conn, command).await?;
        return Ok(());
    }

    let store: Arc<dyn DocumentStore> = Arc::new(SeaDocumentStore::new(conn));
    let identity = StaticIdentity::from(cli.actor.or(config.actor_email.clone()));
    let mut session = Session::start(store.as_ref(), &identity).await?;
    let bans = BanList::new(config.cas_retries);

    match cli.command {
        Command::Migrate { .. } => {}
        Command::Status { game_id } => {
            let record = load_game(store.as_ref(), &session, &game_id, config.page_size).await?;
            let tally = record.tally();
            println!("{} ({})", record.info.title, record.id());
            println!(
                "status: {}  (working {}, not working {}, untested {})",
                record.overall_status(),
                tally.working,
                tally.not_working,
                tally.untested
            );
            match record.latest_test() {
                Some(latest) => print_test(latest),
                None => println!("no reports yet"),
            }
        }
        Command::Tests { paging, game } => {
            let mut cursor = PagedQueryCursor::<TestReport>::with_page_size(
                store.clone(),
                ContentKind::Tests.collection(),
                config.page_size,
            );
            if let Some(game) = game {
                cursor = cursor.for_parent(game);
            }
            let (items, has_more) = nth_page(&cursor, paging.page).await?;
            items.iter().for_each(print_test);
            println!("-- page {} ({} items, more: {})", paging.page, items.len(), has_more);
        }
        Command::Comments { kind, paging, parent } => {
            let kind: ContentKind = kind.parse()?;
            if !kind.is_comment() {
                return Err(DomainError::validation(
                    ValidationKind::UnsupportedKind,
                    "use the tests command for test reports",
                )
                .into());
            }
            let mut cursor = PagedQueryCursor::<Comment>::with_page_size(
                store.clone(),
                kind.collection(),
                config.page_size,
            );
            if let Some(parent) = parent {
                cursor = cursor.for_parent(parent);
            }
            let (items, has_more) = nth_page(&cursor, paging.page).await?;
            items.iter().for_each(print_comment);
            println!("-- page {} ({} items, more: {})", paging.page, items.len(), has_more);
        }
        Command::Archive { test_id } => {
            let report = load_test(store.as_ref(), &test_id).await?;
            let outcome = moderation::archive_test(store.as_ref(), &session, &report).await?;
            report_outcome(outcome, |r| print_test(&r));
        }
        Command::Unarchive { test_id } => {
            let report = load_test(store.as_ref(), &test_id).await?;
            let outcome = moderation::unarchive_test(store.as_ref(), &session, &report).await?;
            report_outcome(outcome, |r| print_test(&r));
        }
        Command::Delete { kind, id } => {
            let kind: ContentKind = kind.parse()?;
            let item = load_item(store.as_ref(), kind, &id).await?;
            let outcome = moderation::delete(store.as_ref(), &session, kind, &item).await?;
            report_outcome(outcome, |()| println!("deleted {kind}/{id}"));
        }
        Command::EditRaw { kind, id, json } => {
            let kind: ContentKind = kind.parse()?;
            let item = load_item(store.as_ref(), kind, &id).await?;
            let outcome = moderation::edit_raw(store.as_ref(), &session, kind, &item, &json).await?;
            report_outcome(outcome, |doc| {
                println!("{}", serde_json::Value::Object(doc.fields));
            });
        }
        Command::EditText { kind, id, text } => {
            let kind: ContentKind = kind.parse()?;
            let item = load_item(store.as_ref(), kind, &id).await?;
            let outcome = moderation::edit_text(store.as_ref(), &session, kind, &item, &text).await?;
            report_outcome(outcome, |c| print_comment(&c));
        }
        Command::Ban { action } => match action {
            BanAction::Add { email } => {
                let outcome = bans.add_ban(store.as_ref(), &mut session, &email).await?;
                report_outcome(outcome, |o| println!("{o:?}"));
            }
            BanAction::Remove { email } => {
                let outcome = bans.remove_ban(store.as_ref(), &mut session, &email).await?;
                report_outcome(outcome, |o| println!("{o:?}"));
            }
            BanAction::List => {
                for email in bans.list(store.as_ref()).await? {
                    println!("{email}");
                }
            }
            BanAction::Set { emails } => {
                let outcome = bans.set_banned(store.as_ref(), &mut session, &emails).await?;
                report_outcome(outcome, |set| println!("{} banned", set.len()));
            }
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init_tracing(match cli.log {
        LogArg::Json => telemetry::LogFormat::Json,
        LogArg::Pretty => telemetry::LogFormat::Pretty,
    });

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = %e.code(), "command failed");
            eprintln!("error: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
