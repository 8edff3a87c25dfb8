//! Curio CLI - a local-first catalogue for physical media collections
//!
//! This is the command-line interface for Curio. It provides a
//! user-friendly interface to the core library functionality.

use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::Confirm;
use serde::Deserialize;

use curio_core::backup::{create_local_backup, export_json, import_json, restore_local_backup};
use curio_core::barcode::{detect_format, find_by_barcode, BarcodeScan};
use curio_core::item::{BarcodeFormat, Condition, LoanStatus, WishlistPriority};
use curio_core::loans::{effective_loan_status, overdue_loans, LoanInfo};
use curio_core::migration::migrate_guest_data;
use curio_core::profile::UserProfile;
use curio_core::query::{collection_stats, filter_items, sort_items, ItemFilter, SortOrder};
use curio_core::sharing::ShareOptions;
use curio_core::sync::{merge_items, UserMode};
use curio_core::valuation::ValuationUpdate;
use curio_core::wishlist::WishlistInfo;
use curio_core::{
    Category, Collection, CollectionStore, CurioError, FileBackend, ItemPatch, MediaItem, NewItem,
    VERSION,
};

/// Curio - a local-first catalogue for physical media collections
#[derive(Parser)]
#[command(name = "curio")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory holding the collection data
    #[arg(short, long, global = true, env = "CURIO_DATA_DIR", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an item to the collection
    Add {
        /// Item title
        #[arg(value_name = "TITLE")]
        title: String,

        /// Media category (vinyl, cds, books, dvds, vhs, magazines, games, other)
        #[arg(short, long, value_name = "CATEGORY")]
        category: String,

        /// Photo reference (a file path or URI)
        #[arg(short, long, value_name = "URI")]
        photo: Option<String>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List items
    List {
        /// Filter by category
        #[arg(value_name = "CATEGORY")]
        category: Option<String>,

        /// Filter by a title/notes substring
        #[arg(long, value_name = "TEXT")]
        query: Option<String>,

        /// Only items currently on loan
        #[arg(long)]
        loaned: bool,

        /// Only loans past their expected return date
        #[arg(long)]
        overdue: bool,

        /// Only wishlist items
        #[arg(long)]
        wishlist: bool,

        /// Sort order (newest, oldest, title, title-desc)
        #[arg(long, value_name = "ORDER")]
        sort: Option<String>,

        /// Limit number of results
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Output format (table, plain)
        #[arg(long, value_name = "FORMAT")]
        format: Option<String>,
    },

    /// Show a single item
    Show {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an item's content fields
    Edit {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New category
        #[arg(long, value_name = "CATEGORY")]
        category: Option<String>,

        /// New photo reference
        #[arg(long, value_name = "URI")]
        photo: Option<String>,

        /// New notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an item
    Rm {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Record a loan
    Loan {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Person the item is loaned to
        #[arg(value_name = "BORROWER")]
        to: String,

        /// Contact details for the borrower
        #[arg(long)]
        contact: Option<String>,

        /// Expected return date (ISO-8601 or YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,

        /// Free-form loan notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a returned loan
    Return {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Put an item on the wishlist
    Wish {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Priority (low, medium, high)
        #[arg(long, value_name = "PRIORITY")]
        priority: Option<String>,

        /// Price the owner hopes to pay
        #[arg(long, value_name = "PRICE")]
        target: Option<f64>,

        /// Free-form wishlist notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Take an item off the wishlist
    Unwish {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Record a valuation
    Value {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Current value
        #[arg(value_name = "AMOUNT")]
        amount: f64,

        /// ISO 4217 currency code (defaults to the configured currency)
        #[arg(long, value_name = "CODE")]
        currency: Option<String>,

        /// Original purchase price
        #[arg(long, value_name = "AMOUNT")]
        paid: Option<f64>,

        /// Condition (mint, excellent, good, fair, poor)
        #[arg(long, value_name = "CONDITION")]
        condition: Option<String>,

        /// Where the estimate came from
        #[arg(long)]
        source: Option<String>,
    },

    /// Attach a scanned barcode to an item
    Barcode {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Barcode content
        #[arg(value_name = "CODE")]
        code: String,

        /// Force a symbology (upc, ean, isbn, qr) instead of detecting it
        #[arg(long, value_name = "FORMAT")]
        format: Option<String>,
    },

    /// Look up a barcode in the collection
    Scan {
        /// Barcode content
        #[arg(value_name = "CODE")]
        code: String,
    },

    /// Share an item publicly or with specific users
    Share {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,

        /// Visible to anyone with the link
        #[arg(long, conflicts_with = "with")]
        public: bool,

        /// User id to grant access (repeatable)
        #[arg(long = "with", value_name = "USER_ID")]
        with: Vec<String>,
    },

    /// Stop sharing an item
    Unshare {
        /// Item ID (full UUID or unique prefix)
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Show collection statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a backup of the collection into the data directory
    Backup,

    /// Replace the collection with the local backup
    Restore {
        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Export the collection as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Import items from a JSON export
    Import {
        /// Path to the export file
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Merge into the current collection instead of replacing it
        #[arg(long)]
        merge: bool,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Sign in and attribute guest data to an account
    Login {
        /// Account ID
        #[arg(value_name = "USER_ID")]
        user_id: String,

        /// Account email
        #[arg(long)]
        email: Option<String>,

        /// Display name
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
    },

    /// Go back to guest mode (local data stays on the device)
    Logout,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum, value_name = "SHELL")]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Some(Commands::Add {
            title,
            category,
            photo,
            notes,
        }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(anyhow::anyhow!("Title cannot be empty"));
            }
            let category = category.parse::<Category>()?;

            let collection = open_collection(&dir).await?;
            let mut new = NewItem::new(trimmed, category, photo.unwrap_or_default());
            if let Some(notes) = notes {
                new = new.with_notes(notes);
            }
            if collection.store().user_mode()? == UserMode::Authenticated {
                if let Some(profile) = collection.store().profile()? {
                    new = new.with_user_id(&profile.id);
                }
            }

            let item = collection.add_item(new).await.map_err(storage_error)?;
            if !cli.quiet {
                println!("Added {} ({})", item.title, short_id(&item.id));
            }
        }
        Some(Commands::List {
            category,
            query,
            loaned,
            overdue,
            wishlist,
            sort,
            limit,
            json,
            format,
        }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let items = collection.items();

            let mut filter = ItemFilter::new();
            if let Some(ref value) = category {
                filter = filter.with_category(value.parse::<Category>()?);
            }
            if let Some(query) = query {
                filter = filter.with_query(query);
            }
            let mut selected = filter_items(&items, &filter);

            let now = Utc::now();
            if loaned {
                selected.retain(|item| effective_loan_status(item, now) != LoanStatus::Available);
            }
            if overdue {
                selected.retain(|item| effective_loan_status(item, now) == LoanStatus::Overdue);
            }
            if wishlist {
                selected.retain(|item| item.wishlist);
            }

            let order = match sort {
                Some(ref value) => value.parse::<SortOrder>()?,
                None => SortOrder::default(),
            };
            let mut selected = sort_items(selected, order);
            if let Some(limit) = limit {
                selected.truncate(limit);
            }

            let format = parse_output_format(format.as_deref())?;
            if json {
                if format.is_some() {
                    return Err(anyhow::anyhow!("--format cannot be used with --json"));
                }
                println!("{}", serde_json::to_string_pretty(&selected)?);
            } else {
                match format.unwrap_or(OutputFormat::Table) {
                    OutputFormat::Table => {
                        if selected.is_empty() {
                            if !cli.quiet {
                                println!("No items found.");
                            }
                        } else {
                            if !cli.quiet {
                                println!("ID | CATEGORY | STATUS | TITLE");
                            }
                            for item in &selected {
                                println!(
                                    "{} | {} | {} | {}",
                                    short_id(&item.id),
                                    item.category,
                                    status_label(item, now),
                                    item.title
                                );
                            }
                        }
                    }
                    OutputFormat::Plain => {
                        for item in &selected {
                            println!(
                                "{} {} {} {}",
                                short_id(&item.id),
                                item.category,
                                status_label(item, now),
                                item.title
                            );
                        }
                    }
                }
            }
        }
        Some(Commands::Show { id, json }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&item)?);
            } else {
                print_item(&item, cli.quiet);
            }
        }
        Some(Commands::Edit {
            id,
            title,
            category,
            photo,
            notes,
        }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            let mut patch = ItemPatch::new();
            if let Some(title) = title {
                let trimmed = title.trim();
                if trimmed.is_empty() {
                    return Err(anyhow::anyhow!("Title cannot be empty"));
                }
                patch = patch.title(trimmed);
            }
            if let Some(ref value) = category {
                patch = patch.category(value.parse::<Category>()?);
            }
            if let Some(photo) = photo {
                patch = patch.photo_uri(photo);
            }
            if let Some(notes) = notes {
                patch = patch.notes(notes);
            }
            if patch.is_empty() {
                return Err(anyhow::anyhow!(
                    "Nothing to change; pass at least one field option"
                ));
            }

            let updated = collection
                .update_item(&item.id, patch)
                .await
                .map_err(storage_error)?;
            let updated = require_found(updated, &id)?;
            if !cli.quiet {
                println!("Updated {} ({})", updated.title, short_id(&updated.id));
            }
        }
        Some(Commands::Rm { id, yes }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            if !confirm(&format!("Delete \"{}\"?", item.title), yes)? {
                println!("Aborted.");
                return Ok(());
            }

            let deleted = collection
                .delete_item(&item.id)
                .await
                .map_err(storage_error)?;
            let deleted = require_found(deleted, &id)?;
            if !cli.quiet {
                println!("Deleted {} ({})", deleted.title, short_id(&deleted.id));
            }
        }
        Some(Commands::Loan {
            id,
            to,
            contact,
            due,
            notes,
        }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            let mut loan = LoanInfo::new(&to);
            if let Some(contact) = contact {
                loan = loan.with_contact(contact);
            }
            if let Some(ref due) = due {
                loan = loan.with_expected_return(parse_datetime(due)?);
            }
            if let Some(notes) = notes {
                loan = loan.with_notes(notes);
            }

            let updated = collection
                .loan_item(&item.id, loan)
                .await
                .map_err(storage_error)?;
            let updated = require_found(updated, &id)?;
            if !cli.quiet {
                match updated.expected_return_date {
                    Some(due) => println!(
                        "Loaned {} to {} (due {})",
                        updated.title,
                        to,
                        due.format("%Y-%m-%d")
                    ),
                    None => println!("Loaned {} to {}", updated.title, to),
                }
            }
        }
        Some(Commands::Return { id }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            let updated = collection
                .return_item(&item.id)
                .await
                .map_err(storage_error)?;
            let updated = require_found(updated, &id)?;
            if !cli.quiet {
                println!("Marked {} as returned", updated.title);
            }
        }
        Some(Commands::Wish {
            id,
            priority,
            target,
            notes,
        }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let config = load_config(&dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            let mut info = WishlistInfo::new();
            if let Some(ref value) = priority {
                info = info.with_priority(value.parse::<WishlistPriority>()?);
            }
            if let Some(target) = target {
                info = info
                    .with_target_price(target)
                    .with_currency(&config.default_currency);
            }
            if let Some(notes) = notes {
                info = info.with_notes(notes);
            }

            let updated = collection
                .add_to_wishlist(&item.id, info)
                .await
                .map_err(storage_error)?;
            let updated = require_found(updated, &id)?;
            if !cli.quiet {
                let priority = updated
                    .wishlist_priority
                    .unwrap_or(WishlistPriority::Medium);
                println!("Added {} to the wishlist ({} priority)", updated.title, priority);
            }
        }
        Some(Commands::Unwish { id }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            let updated = collection
                .remove_from_wishlist(&item.id)
                .await
                .map_err(storage_error)?;
            let updated = require_found(updated, &id)?;
            if !cli.quiet {
                println!("Removed {} from the wishlist", updated.title);
            }
        }
        Some(Commands::Value {
            id,
            amount,
            currency,
            paid,
            condition,
            source,
        }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let config = load_config(&dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            let currency = currency.unwrap_or(config.default_currency);
            let mut update = ValuationUpdate::new(amount).with_currency(&currency);
            if let Some(paid) = paid {
                update = update.with_purchase_price(paid);
            }
            if let Some(ref value) = condition {
                update = update.with_condition(value.parse::<Condition>()?);
            }
            if let Some(source) = source {
                update = update.with_source(source);
            }

            let updated = collection
                .set_valuation(&item.id, update)
                .await
                .map_err(storage_error)?;
            let updated = require_found(updated, &id)?;
            if !cli.quiet {
                println!("Valued {} at {:.2} {}", updated.title, amount, currency);
            }
        }
        Some(Commands::Barcode { id, code, format }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            let scan = match format {
                Some(ref value) => {
                    BarcodeScan::with_format(&code, value.parse::<BarcodeFormat>()?)?
                }
                None => BarcodeScan::detect(&code)?,
            };
            let symbology = scan.format;

            let updated = collection
                .attach_barcode(&item.id, scan)
                .await
                .map_err(storage_error)?;
            let updated = require_found(updated, &id)?;
            if !cli.quiet {
                println!("Attached {} barcode to {}", symbology, updated.title);
            }
        }
        Some(Commands::Scan { code }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let items = collection.items();

            match find_by_barcode(&items, &code) {
                Some(item) => {
                    println!(
                        "{} | {} | {}",
                        short_id(&item.id),
                        item.category,
                        item.title
                    );
                }
                None => {
                    println!("No item with barcode {} (reads as {})", code, detect_format(&code));
                }
            }
        }
        Some(Commands::Share { id, public, with }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            let options = if public {
                ShareOptions::public()
            } else if !with.is_empty() {
                ShareOptions::with_users(with)
            } else {
                return Err(anyhow::anyhow!("Pass --public or at least one --with user"));
            };

            let updated = collection
                .share_item(&item.id, options)
                .await
                .map_err(storage_error)?;
            let updated = require_found(updated, &id)?;
            if !cli.quiet {
                let token = updated.share_token.as_deref().unwrap_or_default();
                println!("Sharing {} (token {})", updated.title, token);
            }
        }
        Some(Commands::Unshare { id }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let item = resolve_item(&collection, &id)?;

            let updated = collection
                .revoke_sharing(&item.id)
                .await
                .map_err(storage_error)?;
            let updated = require_found(updated, &id)?;
            if !cli.quiet {
                println!("Stopped sharing {}", updated.title);
            }
        }
        Some(Commands::Stats { json }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let config = load_config(&dir)?;
            let collection = open_collection(&dir).await?;
            let items = collection.items();
            let stats = collection_stats(&items, &config.default_currency);

            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                let overdue = overdue_loans(&items, Utc::now()).len();
                println!("Items: {}", stats.total_items);
                println!("Estimated value: {:.2} {}", stats.total_value, stats.currency);
                println!("On loan: {} ({} overdue)", stats.loaned_items, overdue);
                println!("Wishlist: {}", stats.wishlist_items);
                if !stats.items_by_category.is_empty() {
                    println!("By category:");
                    for (category, count) in &stats.items_by_category {
                        let value = stats
                            .value_by_category
                            .get(category)
                            .copied()
                            .unwrap_or(0.0);
                        println!(
                            "  {}: {} ({:.2} {})",
                            category.label(),
                            count,
                            value,
                            stats.currency
                        );
                    }
                }
            }
        }
        Some(Commands::Backup) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let items = collection.items();

            let metadata = create_local_backup(collection.store(), &items).map_err(storage_error)?;
            if !cli.quiet {
                println!(
                    "Backed up {} items (backup #{})",
                    items.len(),
                    metadata.backup_count
                );
            }
        }
        Some(Commands::Restore { yes }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;

            let backup = restore_local_backup(collection.store())?
                .ok_or_else(|| anyhow::anyhow!("No local backup found"))?;
            let prompt = format!(
                "Replace the current collection ({} items) with the backup ({} items)?",
                collection.len(),
                backup.len()
            );
            if !confirm(&prompt, yes)? {
                println!("Aborted.");
                return Ok(());
            }

            let count = collection.replace_all(backup).await.map_err(storage_error)?;
            if !cli.quiet {
                println!("Restored {} items", count);
            }
        }
        Some(Commands::Export { output }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            let items = collection.items();

            let payload = export_json(&items)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &payload).map_err(|e| {
                        anyhow::anyhow!("Failed to write {}: {}", path.display(), e)
                    })?;
                    if !cli.quiet {
                        println!("Exported {} items to {}", items.len(), path.display());
                    }
                }
                None => println!("{}", payload),
            }
        }
        Some(Commands::Import { path, merge, yes }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let text = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
            let imported = import_json(&text)?;
            let collection = open_collection(&dir).await?;

            if merge {
                let merged = merge_items(&collection.items(), &imported);
                let count = collection.replace_all(merged).await.map_err(storage_error)?;
                if !cli.quiet {
                    println!(
                        "Merged {} items into the collection (now {})",
                        imported.len(),
                        count
                    );
                }
            } else {
                let prompt = format!(
                    "Replace the current collection ({} items) with the import ({} items)?",
                    collection.len(),
                    imported.len()
                );
                if !confirm(&prompt, yes)? {
                    println!("Aborted.");
                    return Ok(());
                }

                let count = collection
                    .replace_all(imported)
                    .await
                    .map_err(storage_error)?;
                if !cli.quiet {
                    println!("Imported {} items", count);
                }
            }
        }
        Some(Commands::Login {
            user_id,
            email,
            name,
        }) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            if collection.store().user_mode()? == UserMode::Authenticated {
                return Err(anyhow::anyhow!(
                    "Already signed in; run `curio logout` first"
                ));
            }

            let migrated = migrate_guest_data(&collection, &user_id)
                .await
                .map_err(storage_error)?;

            let mut profile = UserProfile::new(&user_id);
            if let Some(email) = email {
                profile = profile.with_email(email);
            }
            if let Some(name) = name {
                profile = profile.with_display_name(name);
            }
            collection.store().save_profile(&profile)?;
            collection.store().set_user_mode(UserMode::Authenticated)?;

            if !cli.quiet {
                println!(
                    "Signed in as {}; {} items attributed to the account",
                    user_id,
                    migrated.len()
                );
            }
        }
        Some(Commands::Logout) => {
            let dir = require_data_dir(cli.data_dir)?;
            let collection = open_collection(&dir).await?;
            collection.store().set_user_mode(UserMode::Guest)?;
            collection.store().clear_profile()?;
            if !cli.quiet {
                println!("Signed out; local data stays on this device");
            }
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "curio", &mut io::stdout());
        }
        None => {
            println!("Curio v{}", VERSION);
            println!("\nRun `curio --help` for usage information.");
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn require_data_dir(dir: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    dir.ok_or_else(|| {
        anyhow::anyhow!("No data directory provided. Use --data-dir or set CURIO_DATA_DIR.")
    })
}

async fn open_collection(dir: &Path) -> anyhow::Result<Collection> {
    let backend = FileBackend::open(dir)?;
    let store = CollectionStore::new(Arc::new(backend))?;
    Ok(Collection::open(store).await)
}

/// Settings read from `config.toml` in the data directory.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct CliConfig {
    /// ISO 4217 code used for valuations and statistics
    default_currency: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
        }
    }
}

fn load_config(dir: &Path) -> anyhow::Result<CliConfig> {
    let path = dir.join("config.toml");
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(CliConfig::default()),
        Err(err) => {
            return Err(anyhow::anyhow!("Failed to read {}: {}", path.display(), err));
        }
    };
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
}

/// Map core errors to actionable messages; a full device is the one
/// storage failure the user can do something about.
fn storage_error(err: CurioError) -> anyhow::Error {
    if err.is_storage_full() {
        anyhow::anyhow!("Device storage is full. Free up space or remove items, then try again.")
    } else {
        anyhow::Error::new(err)
    }
}

fn resolve_item(collection: &Collection, id_or_prefix: &str) -> anyhow::Result<MediaItem> {
    let items = collection.items();
    let matches: Vec<&MediaItem> = items
        .iter()
        .filter(|item| item.id.starts_with(id_or_prefix))
        .collect();
    match matches.len() {
        0 => Err(anyhow::anyhow!("No item matches \"{}\"", id_or_prefix)),
        1 => Ok(matches[0].clone()),
        n => Err(anyhow::anyhow!(
            "\"{}\" matches {} items; use a longer prefix",
            id_or_prefix,
            n
        )),
    }
}

fn require_found(item: Option<MediaItem>, id: &str) -> anyhow::Result<MediaItem> {
    item.ok_or_else(|| anyhow::anyhow!("No item matches \"{}\"", id))
}

fn confirm(prompt: &str, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "Confirmation required; re-run with --yes to proceed"
        ));
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read confirmation: {}", e))
}

fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date value: {}", value))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(anyhow::anyhow!(
        "Invalid date/time (expected ISO-8601 or YYYY-MM-DD): {}",
        value
    ))
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Table,
    Plain,
}

fn parse_output_format(value: Option<&str>) -> anyhow::Result<Option<OutputFormat>> {
    match value {
        None => Ok(None),
        Some("table") => Ok(Some(OutputFormat::Table)),
        Some("plain") => Ok(Some(OutputFormat::Plain)),
        Some(other) => Err(anyhow::anyhow!(
            "Unsupported format: {} (use table or plain)",
            other
        )),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn status_label(item: &MediaItem, now: DateTime<Utc>) -> &'static str {
    if item.wishlist {
        return "wishlist";
    }
    match effective_loan_status(item, now) {
        LoanStatus::Available => "owned",
        LoanStatus::Loaned => "loaned",
        LoanStatus::Overdue => "overdue",
    }
}

fn print_item(item: &MediaItem, quiet: bool) {
    if quiet {
        println!("{} {}", short_id(&item.id), item.title);
        return;
    }

    let now = Utc::now();
    println!("ID: {}", item.id);
    println!("Title: {}", item.title);
    println!("Category: {}", item.category.label());
    if !item.photo_uri.is_empty() {
        println!("Photo: {}", item.photo_uri);
    }
    if let Some(notes) = &item.notes {
        println!("Notes: {}", notes);
    }
    if let Some(value) = item.current_value {
        match &item.currency {
            Some(currency) => println!("Value: {:.2} {}", value, currency),
            None => println!("Value: {:.2}", value),
        }
    }
    if let Some(condition) = item.condition {
        println!("Condition: {}", condition);
    }
    match effective_loan_status(item, now) {
        LoanStatus::Available => {}
        status => {
            let borrower = item.loaned_to.as_deref().unwrap_or("unknown");
            match item.expected_return_date {
                Some(due) if status == LoanStatus::Overdue => println!(
                    "Loan: {} (due {}, overdue)",
                    borrower,
                    due.format("%Y-%m-%d")
                ),
                Some(due) => println!("Loan: {} (due {})", borrower, due.format("%Y-%m-%d")),
                None => println!("Loan: {}", borrower),
            }
        }
    }
    if item.wishlist {
        let priority = item.wishlist_priority.unwrap_or(WishlistPriority::Medium);
        match item.target_price {
            Some(target) => println!("Wishlist: {} priority (target {:.2})", priority, target),
            None => println!("Wishlist: {} priority", priority),
        }
    }
    if let Some(barcode) = &item.barcode {
        match item.barcode_type {
            Some(format) => println!("Barcode: {} ({})", barcode, format),
            None => println!("Barcode: {}", barcode),
        }
    }
    println!("Added: {}", item.created_at);
    println!("Updated: {} (v{})", item.updated_at, item.version);
}
