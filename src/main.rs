use chrono::{DateTime, Duration, Local, Utc};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use getit::catalog;
use getit::config::{BuildMode, Config, DEFAULT_DATA_DIR};
use getit::history::{self, SortOrder};
use getit::id::generate_item_id;
use getit::logging;
use getit::model::{DEFAULT_UNIT, ItemDraft, List, ListEntry, Reminder};
use getit::persist::ErrorCallback;
use getit::reminder::LogScheduler;
use getit::share;
use getit::storage::{FileStorage, KeyValueStorage, StorageError};
use getit::{OnboardingStore, ShoppingStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Floor for `+`/`-` steps on a basket item.
const MIN_QUANTITY: f64 = 1.0;
const MIN_ENTERED_QUANTITY: f64 = 0.01;
const MAX_ENTERED_QUANTITY: f64 = 99.99;
/// How long `undo` stays available after an archive.
const UNDO_WINDOW_SECS: i64 = 5;

#[derive(Parser)]
#[command(name = "getit", about = "GetIt: shopping lists on your device")]
struct Cli {
    /// Directory holding the persisted stores
    #[arg(long, env = "GETIT_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,
    #[arg(long, env = "GETIT_LOG", global = true)]
    log_level: Option<String>,
    /// dev: onboarding always shows and is never saved
    #[arg(long, env = "GETIT_MODE", default_value = "prod", global = true)]
    mode: BuildMode,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Create the data directory
    Init,
    /// First-run flag
    Onboarding {
        #[command(subcommand)]
        action: OnboardingCmd,
    },
    /// Print shell completions
    Completions { shell: Shell },
    #[command(flatten)]
    Shop(ShopCmd),
}

/// Commands that work on the shopping store.
#[derive(Subcommand)]
enum ShopCmd {
    /// Add an item to the basket (catalog id or free-form name)
    Add {
        item: String,
        #[arg(short, long, default_value_t = 1.0)]
        quantity: f64,
        #[arg(short, long)]
        unit: Option<String>,
        #[arg(long)]
        urgent: bool,
    },
    /// Remove an item from the basket
    Rm { id: String },
    /// Dismiss a catalog item from browsing
    Hide { id: String },
    /// Flag a basket item as urgent
    Urgent { id: String },
    /// Set a basket quantity: `3` sets it, `+1`/`-1` steps it (never below 1)
    Qty {
        id: String,
        #[arg(allow_hyphen_values = true)]
        quantity: QuantityArg,
    },
    /// Set a basket unit, or cycle through the catalog's options when omitted
    Unit { id: String, unit: Option<String> },
    /// Toggle purchased on a basket item
    Toggle { id: String },
    /// Show the basket
    Basket,
    /// Name the basket before archiving
    Name {
        name: Option<String>,
        #[arg(long, conflicts_with = "name")]
        clear: bool,
    },
    /// Move the basket into past lists
    Archive,
    /// Restore the list archived in the last few seconds
    Undo,
    /// Past lists grouped by day
    Lists {
        #[arg(long, default_value = "desc")]
        order: SortOrder,
    },
    /// Show a past list
    Show { id: String },
    /// Create a past list from NAME=QTY entries
    New {
        name: String,
        #[arg(required = true)]
        entries: Vec<String>,
    },
    /// Edit a past list
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Remove an item by id
        #[arg(long = "remove")]
        remove: Vec<String>,
        /// Toggle purchased on an item by id
        #[arg(long = "toggle")]
        toggle: Vec<String>,
        /// ITEM_ID=QTY
        #[arg(long = "qty")]
        qty: Vec<String>,
    },
    /// Delete a past list
    Delete { id: String },
    /// Set or clear a reminder on a past list
    Remind {
        id: String,
        /// RFC 3339 timestamp, e.g. 2026-10-20T09:00:00+02:00
        #[arg(long, conflicts_with_all = ["in_minutes", "clear"])]
        at: Option<String>,
        #[arg(long, conflicts_with = "clear")]
        in_minutes: Option<i64>,
        #[arg(long)]
        clear: bool,
    },
    /// Print share text for the basket or a past list
    Share { id: Option<String> },
    /// Swipe candidates in a category (lists categories when omitted)
    Browse { category: Option<String> },
}

#[derive(Subcommand)]
enum OnboardingCmd {
    Status,
    Complete,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum QuantityArg {
    Set(f64),
    Step(f64),
}

impl std::str::FromStr for QuantityArg {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let value: f64 = s
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| format!("invalid quantity: {s} (use 1.5, +1 or -1)"))?;
        if s.starts_with('+') || s.starts_with('-') {
            Ok(QuantityArg::Step(value))
        } else {
            Ok(QuantityArg::Set(value))
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), String> {
    let config = Config {
        data_dir: cli.data_dir,
        log_level: cli
            .log_level
            .unwrap_or_else(|| logging::default_log_level().to_string()),
        mode: cli.mode,
    };

    match cli.command {
        Cmd::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "getit", &mut std::io::stdout());
            Ok(())
        }
        Cmd::Init => {
            if config.data_dir.exists() {
                return Err(format!("{} already initialized", config.data_dir.display()));
            }
            std::fs::create_dir_all(&config.data_dir).map_err(|e| e.to_string())?;
            start_logging(&config);
            println!("initialized {}/", config.data_dir.display());
            Ok(())
        }
        Cmd::Onboarding { action } => {
            let storage = open_storage(&config)?;
            let mut onboarding =
                OnboardingStore::open_with_error_callback(storage, config.mode, Some(warn_on_save()));
            match action {
                OnboardingCmd::Status => {}
                OnboardingCmd::Complete => onboarding.complete_onboarding(),
                OnboardingCmd::Reset => onboarding.reset_onboarding(),
            }
            if onboarding.has_completed_onboarding() {
                println!("onboarding completed");
            } else {
                println!("onboarding not completed");
            }
            Ok(())
        }
        Cmd::Shop(command) => {
            let storage = open_storage(&config)?;
            let mut store = ShoppingStore::open_with_error_callback(storage, Some(warn_on_save()))
                .with_scheduler(LogScheduler);
            expire_stale_undo(&mut store, Utc::now());
            run_shopping(&mut store, command)
        }
    }
}

fn run_shopping(store: &mut ShoppingStore, command: ShopCmd) -> Result<(), String> {
    match command {
        ShopCmd::Add {
            item,
            quantity,
            unit,
            urgent,
        } => {
            let (draft, default_unit) = match catalog::find_item(&item) {
                Some(entry) => (entry.draft(), entry.kind.default_unit()),
                None => {
                    let name = item.trim();
                    if name.is_empty() {
                        return Err("item name cannot be empty".to_string());
                    }
                    let existing: Vec<&str> = store.basket().iter().map(|i| i.id.as_str()).collect();
                    let id = generate_item_id(name, &existing);
                    (ItemDraft::new(id, name, ""), DEFAULT_UNIT)
                }
            };
            let draft = if urgent { draft.urgent() } else { draft };
            let id = draft.id.clone();
            let unit = unit.unwrap_or_else(|| default_unit.to_string());
            store.add_to_basket_with(draft, entered_quantity(quantity)?, &unit);
            println!("added {id}");
            Ok(())
        }
        ShopCmd::Rm { id } => {
            require_basket_item(store, &id)?;
            store.remove_from_basket(&id);
            println!("removed {id}");
            Ok(())
        }
        ShopCmd::Hide { id } => {
            store.hide_item(&id);
            println!("hid {id}");
            Ok(())
        }
        ShopCmd::Urgent { id } => {
            require_basket_item(store, &id)?;
            store.mark_urgent(&id);
            println!("marked {id} urgent");
            Ok(())
        }
        ShopCmd::Qty { id, quantity } => {
            let current = require_basket_item(store, &id)?.quantity;
            let next = adjusted_quantity(current, quantity)?;
            store.update_quantity(&id, next);
            println!("{id} quantity {next}");
            Ok(())
        }
        ShopCmd::Unit { id, unit } => {
            let current = require_basket_item(store, &id)?.unit.clone();
            let unit = match unit {
                Some(u) => u,
                None => {
                    let entry = catalog::find_item(&id)
                        .ok_or_else(|| format!("'{id}' is not a catalog item; give a unit"))?;
                    entry.kind.next_unit(&current).to_string()
                }
            };
            store.update_unit(&id, &unit);
            println!("{id} unit {unit}");
            Ok(())
        }
        ShopCmd::Toggle { id } => {
            require_basket_item(store, &id)?;
            store.toggle_purchased(&id);
            println!("toggled {id}");
            Ok(())
        }
        ShopCmd::Basket => {
            if store.basket().is_empty() {
                println!("basket is empty");
                return Ok(());
            }
            if let Some(name) = store.current_list_name() {
                println!("{name}");
            }
            print_items(store.basket());
            Ok(())
        }
        ShopCmd::Name { name, clear } => {
            if clear {
                store.set_current_list_name(None);
                println!("cleared list name");
                return Ok(());
            }
            let name = name.ok_or("give a name or --clear")?;
            let name = name.trim();
            if name.is_empty() {
                return Err("list name cannot be empty".to_string());
            }
            store.set_current_list_name(Some(name.to_string()));
            println!("named basket {name}");
            Ok(())
        }
        ShopCmd::Archive => {
            let id = store
                .archive_current_list()
                .ok_or("basket is empty, nothing to archive")?;
            println!("archived {id} (undo available for {UNDO_WINDOW_SECS}s)");
            Ok(())
        }
        ShopCmd::Undo => {
            if !store.undo_archive() {
                return Err("nothing to undo".to_string());
            }
            println!("restored basket");
            Ok(())
        }
        ShopCmd::Lists { order } => {
            if store.past_lists().is_empty() {
                println!("no past lists");
                return Ok(());
            }
            let now = Local::now();
            for section in history::group_by_day(store.past_lists(), &now, order) {
                println!("{}", section.title);
                for list in section.lists {
                    print_list_row(list, now.with_timezone(&Utc));
                }
            }
            Ok(())
        }
        ShopCmd::Show { id } => {
            let list = store.past_list(&id).ok_or_else(|| format!("no list '{id}'"))?;
            println!("  ID: {}", list.id);
            println!("  Name: {}", list.name);
            println!(
                "  Date: {}",
                list.date.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            );
            println!("  Progress: {}", list.progress());
            if let Some(reminder) = &list.reminder {
                println!("  {}", reminder_label(reminder, Utc::now()));
            }
            print_items(&list.items);
            Ok(())
        }
        ShopCmd::New { name, entries } => {
            let name = name.trim();
            if name.is_empty() {
                return Err("list name cannot be empty".to_string());
            }
            let entries = collect_entries(&entries)?;
            let id = store.create_new_list(name, &entries);
            println!("created {id}");
            Ok(())
        }
        ShopCmd::Edit {
            id,
            name,
            remove,
            toggle,
            qty,
        } => {
            let mut draft = store
                .past_list(&id)
                .ok_or_else(|| format!("no list '{id}'"))?
                .clone();
            apply_edits(&mut draft, name, &remove, &toggle, &qty)?;
            draft.date = Utc::now();
            store.update_list(&id, draft);
            println!("updated {id}");
            Ok(())
        }
        ShopCmd::Delete { id } => {
            if !store.delete_past_list(&id) {
                return Err(format!("no list '{id}'"));
            }
            println!("deleted {id}");
            Ok(())
        }
        ShopCmd::Remind {
            id,
            at,
            in_minutes,
            clear,
        } => {
            if store.past_list(&id).is_none() {
                return Err(format!("no list '{id}'"));
            }
            if clear {
                store.set_reminder(&id, None);
                println!("cleared reminder on {id}");
                return Ok(());
            }
            let now = Utc::now();
            let date = match (at, in_minutes) {
                (Some(at), _) => DateTime::parse_from_rfc3339(&at)
                    .map_err(|e| format!("invalid date '{at}': {e}"))?
                    .with_timezone(&Utc),
                (None, Some(minutes)) => now + Duration::minutes(minutes),
                (None, None) => return Err("give --at, --in-minutes or --clear".to_string()),
            };
            if date <= now {
                return Err("please select a future date and time for the reminder".to_string());
            }
            store.set_reminder(&id, Some(Reminder::at(date)));
            println!(
                "reminder on {id} at {}",
                date.with_timezone(&Local).format("%a, %b %-d, %-I:%M %p")
            );
            Ok(())
        }
        ShopCmd::Share { id } => {
            let message = match id {
                Some(id) => {
                    let list = store.past_list(&id).ok_or_else(|| format!("no list '{id}'"))?;
                    share::list_message(list)
                }
                None => share::basket_message(store.current_list_name(), store.basket()),
            };
            match message {
                Some(message) => println!("{message}"),
                None => println!("nothing to share"),
            }
            Ok(())
        }
        ShopCmd::Browse { category } => {
            let Some(key) = category else {
                for c in catalog::CATEGORIES {
                    println!("{:<12} {}", c.id, c.name);
                }
                return Ok(());
            };
            let category =
                catalog::category(&key).ok_or_else(|| format!("unknown category: {key}"))?;
            let mut any = false;
            for item in catalog::browse(category, store.hidden_items(), store.basket()) {
                any = true;
                println!(
                    "{:<6} {:<18} {}",
                    item.id,
                    item.name,
                    item.kind.unit_options().join("/")
                );
            }
            if !any {
                println!("no more items in {}", category.name);
            }
            Ok(())
        }
    }
}

fn open_storage(config: &Config) -> Result<Arc<dyn KeyValueStorage>, String> {
    if !config.data_dir.is_dir() {
        return Err(format!(
            "{} not found (run `getit init`)",
            config.data_dir.display()
        ));
    }
    start_logging(config);
    Ok(Arc::new(FileStorage::new(config.data_dir.clone())))
}

fn start_logging(config: &Config) {
    if let Err(e) = logging::init_logging(&config.log_level, &config.log_dir()) {
        eprintln!("warning: logging disabled: {e}");
    }
}

fn warn_on_save() -> ErrorCallback {
    Arc::new(|key: &str, err: &StorageError| eprintln!("warning: could not save {key}: {err}"))
}

/// Drops the undo buffer once its window has passed, as the basket screen's timer does.
fn expire_stale_undo(store: &mut ShoppingStore, now: DateTime<Utc>) -> bool {
    let expired = store
        .last_archived_list()
        .is_some_and(|list| now - list.date > Duration::seconds(UNDO_WINDOW_SECS));
    if expired {
        store.clear_undo();
    }
    expired
}

/// Two decimal places, as the quantity picker shows them.
fn round_quantity(quantity: f64) -> f64 {
    (quantity * 100.0).round() / 100.0
}

/// Typed-in quantities are kept within the picker's 0.01..=99.99 range.
fn entered_quantity(quantity: f64) -> Result<f64, String> {
    if !quantity.is_finite() {
        return Err(format!("invalid quantity: {quantity}"));
    }
    Ok(round_quantity(quantity.clamp(MIN_ENTERED_QUANTITY, MAX_ENTERED_QUANTITY)))
}

fn adjusted_quantity(current: f64, arg: QuantityArg) -> Result<f64, String> {
    match arg {
        QuantityArg::Set(value) => entered_quantity(value),
        QuantityArg::Step(delta) => Ok(round_quantity((current + delta).max(MIN_QUANTITY))),
    }
}

fn require_basket_item<'a>(store: &'a ShoppingStore, id: &str) -> Result<&'a getit::Item, String> {
    store
        .basket_item(id)
        .ok_or_else(|| format!("no basket item '{id}'"))
}

/// Parses NAME or NAME=QTY; repeated names add up.
fn collect_entries(raw: &[String]) -> Result<Vec<ListEntry>, String> {
    let mut entries: Vec<ListEntry> = Vec::new();
    for arg in raw {
        let (name, quantity) = match arg.rsplit_once('=') {
            Some((name, qty)) => {
                let qty: f64 = qty
                    .trim()
                    .parse()
                    .map_err(|_| format!("invalid quantity in '{arg}'"))?;
                (name.trim(), entered_quantity(qty)?)
            }
            None => (arg.trim(), 1.0),
        };
        if name.is_empty() {
            return Err(format!("empty item name in '{arg}'"));
        }
        match entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.quantity = round_quantity(existing.quantity + quantity),
            None => entries.push(ListEntry::new(name, quantity)),
        }
    }
    if entries.is_empty() {
        return Err("please add at least one item to your list".to_string());
    }
    Ok(entries)
}

fn apply_edits(
    draft: &mut List,
    name: Option<String>,
    remove: &[String],
    toggle: &[String],
    qty: &[String],
) -> Result<(), String> {
    if let Some(name) = name {
        let name = name.trim();
        if name.is_empty() {
            return Err("list name cannot be empty".to_string());
        }
        draft.name = name.to_string();
    }
    for id in remove {
        let before = draft.items.len();
        draft.items.retain(|i| &i.id != id);
        if draft.items.len() == before {
            return Err(format!("no item '{id}' in list"));
        }
    }
    for id in toggle {
        let item = draft
            .items
            .iter_mut()
            .find(|i| &i.id == id)
            .ok_or_else(|| format!("no item '{id}' in list"))?;
        item.purchased = Some(!item.is_purchased());
    }
    for arg in qty {
        let (id, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("expected ITEM_ID=QTY, got '{arg}'"))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("invalid quantity in '{arg}'"))?;
        let value = entered_quantity(value)?;
        let item = draft
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| format!("no item '{id}' in list"))?;
        item.quantity = value;
    }
    Ok(())
}

fn reminder_label(reminder: &Reminder, now: DateTime<Utc>) -> String {
    format!(
        "{}: {}",
        reminder.status(now),
        reminder
            .date
            .with_timezone(&Local)
            .format("%a, %b %-d, %-I:%M %p")
    )
}

fn print_items(items: &[getit::Item]) {
    println!("{:<10} {:<4} {}", "ID", "", "ITEM");
    println!("{}", "-".repeat(40));
    for item in items {
        let mut flags = String::new();
        flags.push(if item.is_purchased() { 'x' } else { ' ' });
        flags.push(if item.is_urgent() { '!' } else { ' ' });
        println!("{:<10} [{}] {}", item.id, flags, item);
    }
}

fn print_list_row(list: &List, now: DateTime<Utc>) {
    let mut row = format!(
        "  {:<14} {}  ({}/{})",
        list.id,
        list.name,
        list.purchased_count(),
        list.items.len()
    );
    if let Some(reminder) = list.reminder.as_ref().filter(|r| r.enabled) {
        row.push_str("  ");
        row.push_str(&reminder_label(reminder, now));
    }
    println!("{row}");
}
