use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_curio"))
}

fn temp_data_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "curio_{}_{}_{}",
        prefix,
        std::process::id(),
        nanos
    ));
    std::fs::create_dir_all(&dir).expect("create data dir");
    dir
}

fn add_item(dir: &Path, title: &str, category: &str) {
    let mut add = Command::new(bin());
    add.arg("add")
        .arg(title)
        .arg("--category")
        .arg(category)
        .arg("--data-dir")
        .arg(dir);
    let add = add.output().expect("run add");
    assert!(
        add.status.success(),
        "add failed: stdout={}, stderr={}",
        String::from_utf8_lossy(&add.stdout),
        String::from_utf8_lossy(&add.stderr)
    );
}

fn list_json(dir: &Path) -> serde_json::Value {
    let mut list = Command::new(bin());
    list.arg("list").arg("--json").arg("--data-dir").arg(dir);
    let list = list.output().expect("run list");
    assert!(
        list.status.success(),
        "list failed: stderr={}",
        String::from_utf8_lossy(&list.stderr)
    );
    serde_json::from_slice(&list.stdout).expect("parse list json")
}

fn first_item_id(dir: &Path) -> String {
    let value = list_json(dir);
    let array = value.as_array().expect("list output array");
    assert!(!array.is_empty());
    array[0]
        .get("id")
        .and_then(|v| v.as_str())
        .expect("item id")
        .to_string()
}

#[test]
fn test_cli_add_list_show() {
    let dir = temp_data_dir("add_list_show");
    add_item(&dir, "Abbey Road", "vinyl");

    let value = list_json(&dir);
    let array = value.as_array().expect("list output array");
    assert_eq!(array.len(), 1);
    assert_eq!(
        array[0].get("title").and_then(|v| v.as_str()),
        Some("Abbey Road")
    );
    assert_eq!(
        array[0].get("category").and_then(|v| v.as_str()),
        Some("vinyl")
    );
    assert_eq!(array[0].get("version").and_then(|v| v.as_u64()), Some(1));
    let item_id = array[0]
        .get("id")
        .and_then(|v| v.as_str())
        .expect("item id");

    let mut show = Command::new(bin());
    show.arg("show").arg(&item_id[..8]).arg("--data-dir").arg(&dir);
    let show = show.output().expect("run show");
    assert!(show.status.success());
    let output = String::from_utf8_lossy(&show.stdout);
    assert!(output.contains("Title: Abbey Road"));
    assert!(output.contains("Category: Vinyl Records"));
}

#[test]
fn test_cli_add_rejects_blank_title() {
    let dir = temp_data_dir("blank_title");

    let mut add = Command::new(bin());
    add.arg("add")
        .arg("   ")
        .arg("--category")
        .arg("books")
        .arg("--data-dir")
        .arg(&dir);
    let add = add.output().expect("run add");

    assert!(!add.status.success());
    let stderr = String::from_utf8_lossy(&add.stderr);
    assert!(stderr.contains("Title cannot be empty"));
}

#[test]
fn test_cli_add_rejects_unknown_category() {
    let dir = temp_data_dir("bad_category");

    let mut add = Command::new(bin());
    add.arg("add")
        .arg("Watchmen")
        .arg("--category")
        .arg("comics")
        .arg("--data-dir")
        .arg(&dir);
    let add = add.output().expect("run add");

    assert!(!add.status.success());
    let stderr = String::from_utf8_lossy(&add.stderr);
    assert!(stderr.contains("Unknown category: comics"));
}

#[test]
fn test_cli_list_empty_message() {
    let dir = temp_data_dir("list_empty");

    let mut list = Command::new(bin());
    list.arg("list").arg("--data-dir").arg(&dir);
    let list = list.output().expect("run list");

    assert!(list.status.success());
    let stdout = String::from_utf8_lossy(&list.stdout);
    assert!(stdout.contains("No items found."));
}

#[test]
fn test_cli_list_filters_and_sorts() {
    let dir = temp_data_dir("list_filters");
    add_item(&dir, "Zappa", "vinyl");
    add_item(&dir, "Anathem", "books");

    let mut list = Command::new(bin());
    list.arg("list")
        .arg("books")
        .arg("--json")
        .arg("--data-dir")
        .arg(&dir);
    let list = list.output().expect("run list");
    assert!(list.status.success());
    let value: serde_json::Value = serde_json::from_slice(&list.stdout).expect("parse list json");
    let array = value.as_array().expect("list output array");
    assert_eq!(array.len(), 1);
    assert_eq!(
        array[0].get("title").and_then(|v| v.as_str()),
        Some("Anathem")
    );

    let mut sorted = Command::new(bin());
    sorted
        .arg("list")
        .arg("--sort")
        .arg("title")
        .arg("--format")
        .arg("plain")
        .arg("--data-dir")
        .arg(&dir);
    let sorted = sorted.output().expect("run list sorted");
    assert!(sorted.status.success());
    let stdout = String::from_utf8_lossy(&sorted.stdout);
    let first = stdout.lines().next().expect("first line");
    assert!(first.contains("Anathem"));
}

#[test]
fn test_cli_list_format_conflicts_with_json() {
    let dir = temp_data_dir("format_conflict");

    let mut list = Command::new(bin());
    list.arg("list")
        .arg("--json")
        .arg("--format")
        .arg("plain")
        .arg("--data-dir")
        .arg(&dir);
    let list = list.output().expect("run list");

    assert!(!list.status.success());
    let stderr = String::from_utf8_lossy(&list.stderr);
    assert!(stderr.contains("--format cannot be used with --json"));
}

#[test]
fn test_cli_edit_updates_title() {
    let dir = temp_data_dir("edit_title");
    add_item(&dir, "Dune", "books");
    let item_id = first_item_id(&dir);

    let mut edit = Command::new(bin());
    edit.arg("edit")
        .arg(&item_id)
        .arg("--title")
        .arg("Dune Messiah")
        .arg("--data-dir")
        .arg(&dir);
    let edit = edit.output().expect("run edit");
    assert!(edit.status.success());
    let stdout = String::from_utf8_lossy(&edit.stdout);
    assert!(stdout.contains("Updated Dune Messiah"));

    let value = list_json(&dir);
    let array = value.as_array().expect("list output array");
    assert_eq!(
        array[0].get("title").and_then(|v| v.as_str()),
        Some("Dune Messiah")
    );
    assert_eq!(array[0].get("version").and_then(|v| v.as_u64()), Some(2));
}

#[test]
fn test_cli_edit_without_fields_errors() {
    let dir = temp_data_dir("edit_nothing");
    add_item(&dir, "Dune", "books");
    let item_id = first_item_id(&dir);

    let mut edit = Command::new(bin());
    edit.arg("edit").arg(&item_id).arg("--data-dir").arg(&dir);
    let edit = edit.output().expect("run edit");

    assert!(!edit.status.success());
    let stderr = String::from_utf8_lossy(&edit.stderr);
    assert!(stderr.contains("Nothing to change"));
}

#[test]
fn test_cli_loan_and_return_flow() {
    let dir = temp_data_dir("loan_flow");
    add_item(&dir, "Neuromancer", "books");
    let item_id = first_item_id(&dir);

    let mut loan = Command::new(bin());
    loan.arg("loan")
        .arg(&item_id)
        .arg("Case")
        .arg("--due")
        .arg("2999-01-01")
        .arg("--data-dir")
        .arg(&dir);
    let loan = loan.output().expect("run loan");
    assert!(
        loan.status.success(),
        "loan failed: stderr={}",
        String::from_utf8_lossy(&loan.stderr)
    );
    let stdout = String::from_utf8_lossy(&loan.stdout);
    assert!(stdout.contains("Loaned Neuromancer to Case (due 2999-01-01)"));

    let mut loaned = Command::new(bin());
    loaned
        .arg("list")
        .arg("--loaned")
        .arg("--format")
        .arg("plain")
        .arg("--data-dir")
        .arg(&dir);
    let loaned = loaned.output().expect("run list loaned");
    assert!(loaned.status.success());
    let stdout = String::from_utf8_lossy(&loaned.stdout);
    assert!(stdout.contains("Neuromancer"));
    assert!(stdout.contains("loaned"));

    let mut ret = Command::new(bin());
    ret.arg("return").arg(&item_id).arg("--data-dir").arg(&dir);
    let ret = ret.output().expect("run return");
    assert!(ret.status.success());
    let stdout = String::from_utf8_lossy(&ret.stdout);
    assert!(stdout.contains("Marked Neuromancer as returned"));

    let mut after = Command::new(bin());
    after.arg("list").arg("--loaned").arg("--data-dir").arg(&dir);
    let after = after.output().expect("run list after return");
    assert!(after.status.success());
    let stdout = String::from_utf8_lossy(&after.stdout);
    assert!(stdout.contains("No items found."));
}

#[test]
fn test_cli_overdue_loan_surfaces_in_list() {
    let dir = temp_data_dir("overdue");
    add_item(&dir, "Ubik", "books");
    let item_id = first_item_id(&dir);

    let mut loan = Command::new(bin());
    loan.arg("loan")
        .arg(&item_id)
        .arg("Joe Chip")
        .arg("--due")
        .arg("2020-01-01")
        .arg("--data-dir")
        .arg(&dir);
    let loan = loan.output().expect("run loan");
    assert!(loan.status.success());

    let mut overdue = Command::new(bin());
    overdue
        .arg("list")
        .arg("--overdue")
        .arg("--format")
        .arg("plain")
        .arg("--data-dir")
        .arg(&dir);
    let overdue = overdue.output().expect("run list overdue");
    assert!(overdue.status.success());
    let stdout = String::from_utf8_lossy(&overdue.stdout);
    assert!(stdout.contains("Ubik"));
    assert!(stdout.contains("overdue"));

    let mut show = Command::new(bin());
    show.arg("show").arg(&item_id).arg("--data-dir").arg(&dir);
    let show = show.output().expect("run show");
    assert!(show.status.success());
    let stdout = String::from_utf8_lossy(&show.stdout);
    assert!(stdout.contains("Loan: Joe Chip (due 2020-01-01, overdue)"));
}

#[test]
fn test_cli_wishlist_roundtrip() {
    let dir = temp_data_dir("wishlist");
    add_item(&dir, "Grail Diary", "other");
    let item_id = first_item_id(&dir);

    let mut wish = Command::new(bin());
    wish.arg("wish")
        .arg(&item_id)
        .arg("--priority")
        .arg("high")
        .arg("--target")
        .arg("25.0")
        .arg("--data-dir")
        .arg(&dir);
    let wish = wish.output().expect("run wish");
    assert!(wish.status.success());
    let stdout = String::from_utf8_lossy(&wish.stdout);
    assert!(stdout.contains("Added Grail Diary to the wishlist (high priority)"));

    let mut listed = Command::new(bin());
    listed
        .arg("list")
        .arg("--wishlist")
        .arg("--format")
        .arg("plain")
        .arg("--data-dir")
        .arg(&dir);
    let listed = listed.output().expect("run list wishlist");
    assert!(listed.status.success());
    let stdout = String::from_utf8_lossy(&listed.stdout);
    assert!(stdout.contains("Grail Diary"));
    assert!(stdout.contains("wishlist"));

    let mut unwish = Command::new(bin());
    unwish.arg("unwish").arg(&item_id).arg("--data-dir").arg(&dir);
    let unwish = unwish.output().expect("run unwish");
    assert!(unwish.status.success());
    let stdout = String::from_utf8_lossy(&unwish.stdout);
    assert!(stdout.contains("Removed Grail Diary from the wishlist"));

    let mut after = Command::new(bin());
    after
        .arg("list")
        .arg("--wishlist")
        .arg("--data-dir")
        .arg(&dir);
    let after = after.output().expect("run list after unwish");
    assert!(after.status.success());
    let stdout = String::from_utf8_lossy(&after.stdout);
    assert!(stdout.contains("No items found."));
}

#[test]
fn test_cli_value_uses_configured_currency() {
    let dir = temp_data_dir("value_currency");
    std::fs::write(dir.join("config.toml"), "default_currency = \"EUR\"\n")
        .expect("write config");
    add_item(&dir, "White Album", "vinyl");
    let item_id = first_item_id(&dir);

    let mut value = Command::new(bin());
    value
        .arg("value")
        .arg(&item_id)
        .arg("120.5")
        .arg("--paid")
        .arg("30")
        .arg("--condition")
        .arg("good")
        .arg("--data-dir")
        .arg(&dir);
    let value = value.output().expect("run value");
    assert!(
        value.status.success(),
        "value failed: stderr={}",
        String::from_utf8_lossy(&value.stderr)
    );
    let stdout = String::from_utf8_lossy(&value.stdout);
    assert!(stdout.contains("Valued White Album at 120.50 EUR"));

    let mut show = Command::new(bin());
    show.arg("show")
        .arg(&item_id)
        .arg("--json")
        .arg("--data-dir")
        .arg(&dir);
    let show = show.output().expect("run show");
    assert!(show.status.success());
    let item: serde_json::Value = serde_json::from_slice(&show.stdout).expect("parse show json");
    assert_eq!(item.get("currentValue").and_then(|v| v.as_f64()), Some(120.5));
    assert_eq!(item.get("purchasePrice").and_then(|v| v.as_f64()), Some(30.0));
    assert_eq!(item.get("currency").and_then(|v| v.as_str()), Some("EUR"));
    assert_eq!(item.get("condition").and_then(|v| v.as_str()), Some("good"));
}

#[test]
fn test_cli_barcode_attach_and_scan() {
    let dir = temp_data_dir("barcode");
    add_item(&dir, "OK Computer", "cds");
    let item_id = first_item_id(&dir);

    let mut attach = Command::new(bin());
    attach
        .arg("barcode")
        .arg(&item_id)
        .arg("0724385522925")
        .arg("--data-dir")
        .arg(&dir);
    let attach = attach.output().expect("run barcode");
    assert!(attach.status.success());
    let stdout = String::from_utf8_lossy(&attach.stdout);
    assert!(stdout.contains("Attached ean barcode to OK Computer"));

    let mut scan = Command::new(bin());
    scan.arg("scan")
        .arg("0724385522925")
        .arg("--data-dir")
        .arg(&dir);
    let scan = scan.output().expect("run scan");
    assert!(scan.status.success());
    let stdout = String::from_utf8_lossy(&scan.stdout);
    assert!(stdout.contains("OK Computer"));

    let mut miss = Command::new(bin());
    miss.arg("scan")
        .arg("9999999999999")
        .arg("--data-dir")
        .arg(&dir);
    let miss = miss.output().expect("run scan miss");
    assert!(miss.status.success());
    let stdout = String::from_utf8_lossy(&miss.stdout);
    assert!(stdout.contains("No item with barcode 9999999999999 (reads as ean)"));

    let mut forced = Command::new(bin());
    forced
        .arg("barcode")
        .arg(&item_id)
        .arg("shelf-tag-17")
        .arg("--format")
        .arg("qr")
        .arg("--data-dir")
        .arg(&dir);
    let forced = forced.output().expect("run barcode forced");
    assert!(forced.status.success());
    let stdout = String::from_utf8_lossy(&forced.stdout);
    assert!(stdout.contains("Attached qr barcode to OK Computer"));
}

#[test]
fn test_cli_share_and_unshare() {
    let dir = temp_data_dir("sharing");
    add_item(&dir, "Marquee Moon", "vinyl");
    let item_id = first_item_id(&dir);

    let mut bare = Command::new(bin());
    bare.arg("share").arg(&item_id).arg("--data-dir").arg(&dir);
    let bare = bare.output().expect("run share bare");
    assert!(!bare.status.success());
    let stderr = String::from_utf8_lossy(&bare.stderr);
    assert!(stderr.contains("Pass --public or at least one --with user"));

    let mut share = Command::new(bin());
    share
        .arg("share")
        .arg(&item_id)
        .arg("--public")
        .arg("--data-dir")
        .arg(&dir);
    let share = share.output().expect("run share");
    assert!(share.status.success());
    let stdout = String::from_utf8_lossy(&share.stdout);
    assert!(stdout.contains("Sharing Marquee Moon (token "));

    let mut show = Command::new(bin());
    show.arg("show")
        .arg(&item_id)
        .arg("--json")
        .arg("--data-dir")
        .arg(&dir);
    let show = show.output().expect("run show");
    assert!(show.status.success());
    let item: serde_json::Value = serde_json::from_slice(&show.stdout).expect("parse show json");
    assert_eq!(item.get("isPublic").and_then(|v| v.as_bool()), Some(true));
    assert!(item.get("shareToken").and_then(|v| v.as_str()).is_some());

    let mut unshare = Command::new(bin());
    unshare
        .arg("unshare")
        .arg(&item_id)
        .arg("--data-dir")
        .arg(&dir);
    let unshare = unshare.output().expect("run unshare");
    assert!(unshare.status.success());
    let stdout = String::from_utf8_lossy(&unshare.stdout);
    assert!(stdout.contains("Stopped sharing Marquee Moon"));

    let mut after = Command::new(bin());
    after
        .arg("show")
        .arg(&item_id)
        .arg("--json")
        .arg("--data-dir")
        .arg(&dir);
    let after = after.output().expect("run show after unshare");
    assert!(after.status.success());
    let item: serde_json::Value = serde_json::from_slice(&after.stdout).expect("parse show json");
    assert!(item.get("shareToken").is_none());
}

#[test]
fn test_cli_rm_requires_confirmation() {
    let dir = temp_data_dir("rm_confirm");
    add_item(&dir, "Dark Side", "vinyl");
    let item_id = first_item_id(&dir);

    let mut rm = Command::new(bin());
    rm.arg("rm").arg(&item_id).arg("--data-dir").arg(&dir);
    let rm = rm.output().expect("run rm");
    assert!(!rm.status.success());
    let stderr = String::from_utf8_lossy(&rm.stderr);
    assert!(stderr.contains("Confirmation required"));

    let value = list_json(&dir);
    assert_eq!(value.as_array().expect("list output array").len(), 1);

    let mut rm_yes = Command::new(bin());
    rm_yes
        .arg("rm")
        .arg(&item_id)
        .arg("--yes")
        .arg("--data-dir")
        .arg(&dir);
    let rm_yes = rm_yes.output().expect("run rm --yes");
    assert!(rm_yes.status.success());
    let stdout = String::from_utf8_lossy(&rm_yes.stdout);
    assert!(stdout.contains("Deleted Dark Side"));

    let value = list_json(&dir);
    assert!(value.as_array().expect("list output array").is_empty());
}

#[test]
fn test_cli_backup_and_restore() {
    let dir = temp_data_dir("backup_restore");
    add_item(&dir, "Kid A", "cds");
    add_item(&dir, "Amnesiac", "cds");

    let mut backup = Command::new(bin());
    backup.arg("backup").arg("--data-dir").arg(&dir);
    let backup = backup.output().expect("run backup");
    assert!(
        backup.status.success(),
        "backup failed: stderr={}",
        String::from_utf8_lossy(&backup.stderr)
    );
    let stdout = String::from_utf8_lossy(&backup.stdout);
    assert!(stdout.contains("Backed up 2 items (backup #1)"));

    let item_id = first_item_id(&dir);
    let mut rm = Command::new(bin());
    rm.arg("rm")
        .arg(&item_id)
        .arg("--yes")
        .arg("--data-dir")
        .arg(&dir);
    let rm = rm.output().expect("run rm");
    assert!(rm.status.success());
    let value = list_json(&dir);
    assert_eq!(value.as_array().expect("list output array").len(), 1);

    let mut restore = Command::new(bin());
    restore
        .arg("restore")
        .arg("--yes")
        .arg("--data-dir")
        .arg(&dir);
    let restore = restore.output().expect("run restore");
    assert!(
        restore.status.success(),
        "restore failed: stderr={}",
        String::from_utf8_lossy(&restore.stderr)
    );
    let stdout = String::from_utf8_lossy(&restore.stdout);
    assert!(stdout.contains("Restored 2 items"));

    let value = list_json(&dir);
    assert_eq!(value.as_array().expect("list output array").len(), 2);

    let mut again = Command::new(bin());
    again.arg("backup").arg("--data-dir").arg(&dir);
    let again = again.output().expect("run backup again");
    assert!(again.status.success());
    let stdout = String::from_utf8_lossy(&again.stdout);
    assert!(stdout.contains("backup #2"));
}

#[test]
fn test_cli_restore_without_backup_errors() {
    let dir = temp_data_dir("restore_empty");

    let mut restore = Command::new(bin());
    restore
        .arg("restore")
        .arg("--yes")
        .arg("--data-dir")
        .arg(&dir);
    let restore = restore.output().expect("run restore");

    assert!(!restore.status.success());
    let stderr = String::from_utf8_lossy(&restore.stderr);
    assert!(stderr.contains("No local backup found"));
}

#[test]
fn test_cli_export_and_import() {
    let dir = temp_data_dir("export_import");
    add_item(&dir, "Lateralus", "cds");
    let item_id = first_item_id(&dir);
    let export_path = dir.join("export.json");

    let mut export = Command::new(bin());
    export
        .arg("export")
        .arg("--output")
        .arg(&export_path)
        .arg("--data-dir")
        .arg(&dir);
    let export = export.output().expect("run export");
    assert!(export.status.success());
    let contents = std::fs::read_to_string(&export_path).expect("read export");
    let document: serde_json::Value = serde_json::from_str(&contents).expect("parse export");
    assert_eq!(document.get("itemCount").and_then(|v| v.as_u64()), Some(1));

    let mut rm = Command::new(bin());
    rm.arg("rm")
        .arg(&item_id)
        .arg("--yes")
        .arg("--data-dir")
        .arg(&dir);
    let rm = rm.output().expect("run rm");
    assert!(rm.status.success());

    let mut import = Command::new(bin());
    import
        .arg("import")
        .arg(&export_path)
        .arg("--merge")
        .arg("--data-dir")
        .arg(&dir);
    let import = import.output().expect("run import merge");
    assert!(
        import.status.success(),
        "import failed: stderr={}",
        String::from_utf8_lossy(&import.stderr)
    );
    let stdout = String::from_utf8_lossy(&import.stdout);
    assert!(stdout.contains("Merged 1 items into the collection (now 1)"));

    let value = list_json(&dir);
    let array = value.as_array().expect("list output array");
    assert_eq!(array.len(), 1);
    assert_eq!(
        array[0].get("title").and_then(|v| v.as_str()),
        Some("Lateralus")
    );

    add_item(&dir, "Aenima", "cds");
    let mut replace = Command::new(bin());
    replace
        .arg("import")
        .arg(&export_path)
        .arg("--yes")
        .arg("--data-dir")
        .arg(&dir);
    let replace = replace.output().expect("run import replace");
    assert!(replace.status.success());
    let stdout = String::from_utf8_lossy(&replace.stdout);
    assert!(stdout.contains("Imported 1 items"));

    let value = list_json(&dir);
    assert_eq!(value.as_array().expect("list output array").len(), 1);
}

#[test]
fn test_cli_export_to_stdout() {
    let dir = temp_data_dir("export_stdout");
    add_item(&dir, "In Rainbows", "cds");

    let mut export = Command::new(bin());
    export.arg("export").arg("--data-dir").arg(&dir);
    let export = export.output().expect("run export");
    assert!(export.status.success());
    let document: serde_json::Value =
        serde_json::from_slice(&export.stdout).expect("parse export json");
    assert_eq!(document.get("itemCount").and_then(|v| v.as_u64()), Some(1));
    let items = document
        .get("items")
        .and_then(|v| v.as_array())
        .expect("export items");
    assert_eq!(
        items[0].get("title").and_then(|v| v.as_str()),
        Some("In Rainbows")
    );
}

#[test]
fn test_cli_login_attributes_guest_items() {
    let dir = temp_data_dir("login");
    add_item(&dir, "Snow Crash", "books");
    let item_id = first_item_id(&dir);

    let mut login = Command::new(bin());
    login
        .arg("login")
        .arg("user-1")
        .arg("--email")
        .arg("hiro@example.com")
        .arg("--data-dir")
        .arg(&dir);
    let login = login.output().expect("run login");
    assert!(
        login.status.success(),
        "login failed: stderr={}",
        String::from_utf8_lossy(&login.stderr)
    );
    let stdout = String::from_utf8_lossy(&login.stdout);
    assert!(stdout.contains("Signed in as user-1; 1 items attributed to the account"));

    let mut show = Command::new(bin());
    show.arg("show")
        .arg(&item_id)
        .arg("--json")
        .arg("--data-dir")
        .arg(&dir);
    let show = show.output().expect("run show");
    assert!(show.status.success());
    let item: serde_json::Value = serde_json::from_slice(&show.stdout).expect("parse show json");
    assert_eq!(item.get("userId").and_then(|v| v.as_str()), Some("user-1"));
    assert_eq!(
        item.get("syncStatus").and_then(|v| v.as_str()),
        Some("pending")
    );

    let mut again = Command::new(bin());
    again
        .arg("login")
        .arg("user-2")
        .arg("--data-dir")
        .arg(&dir);
    let again = again.output().expect("run login again");
    assert!(!again.status.success());
    let stderr = String::from_utf8_lossy(&again.stderr);
    assert!(stderr.contains("Already signed in"));

    let mut logout = Command::new(bin());
    logout.arg("logout").arg("--data-dir").arg(&dir);
    let logout = logout.output().expect("run logout");
    assert!(logout.status.success());
    let stdout = String::from_utf8_lossy(&logout.stdout);
    assert!(stdout.contains("Signed out"));

    let value = list_json(&dir);
    assert_eq!(value.as_array().expect("list output array").len(), 1);
}

#[test]
fn test_cli_quiet_add_prints_nothing() {
    let dir = temp_data_dir("quiet_add");

    let mut add = Command::new(bin());
    add.arg("add")
        .arg("Quiet One")
        .arg("--category")
        .arg("other")
        .arg("--quiet")
        .arg("--data-dir")
        .arg(&dir);
    let add = add.output().expect("run add");

    assert!(add.status.success());
    let stdout = String::from_utf8_lossy(&add.stdout);
    assert!(stdout.trim().is_empty());
}

#[test]
fn test_cli_stats_reports_counts() {
    let dir = temp_data_dir("stats");
    add_item(&dir, "Meddle", "vinyl");
    add_item(&dir, "Animals", "vinyl");
    add_item(&dir, "Hyperion", "books");
    let item_id = first_item_id(&dir);

    let mut loan = Command::new(bin());
    loan.arg("loan")
        .arg(&item_id)
        .arg("Sol")
        .arg("--data-dir")
        .arg(&dir);
    let loan = loan.output().expect("run loan");
    assert!(loan.status.success());

    let mut stats = Command::new(bin());
    stats.arg("stats").arg("--data-dir").arg(&dir);
    let stats = stats.output().expect("run stats");
    assert!(stats.status.success());
    let stdout = String::from_utf8_lossy(&stats.stdout);
    assert!(stdout.contains("Items: 3"));
    assert!(stdout.contains("On loan: 1 (0 overdue)"));
    assert!(stdout.contains("Vinyl Records: 2"));

    let mut stats_json = Command::new(bin());
    stats_json
        .arg("stats")
        .arg("--json")
        .arg("--data-dir")
        .arg(&dir);
    let stats_json = stats_json.output().expect("run stats --json");
    assert!(stats_json.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&stats_json.stdout).expect("parse stats json");
    assert_eq!(value.get("totalItems").and_then(|v| v.as_u64()), Some(3));
    assert_eq!(
        value
            .get("itemsByCategory")
            .and_then(|v| v.get("vinyl"))
            .and_then(|v| v.as_u64()),
        Some(2)
    );
}

#[test]
fn test_cli_version_banner_without_command() {
    let mut cmd = Command::new(bin());
    cmd.env_remove("CURIO_DATA_DIR");
    let output = cmd.output().expect("run curio");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Curio v"));
    assert!(stdout.contains("curio --help"));
}

#[test]
fn test_cli_missing_data_dir_errors() {
    let mut list = Command::new(bin());
    list.arg("list").env_remove("CURIO_DATA_DIR");
    let list = list.output().expect("run list");

    assert!(!list.status.success());
    let stderr = String::from_utf8_lossy(&list.stderr);
    assert!(stderr.contains("No data directory provided"));
}

#[test]
fn test_cli_unknown_item_errors() {
    let dir = temp_data_dir("unknown_item");
    add_item(&dir, "Ringworld", "books");

    let mut show = Command::new(bin());
    show.arg("show")
        .arg("ffffffff")
        .arg("--data-dir")
        .arg(&dir);
    let show = show.output().expect("run show");

    assert!(!show.status.success());
    let stderr = String::from_utf8_lossy(&show.stderr);
    assert!(stderr.contains("No item matches \"ffffffff\""));
}

#[test]
fn test_cli_completions_emit_script() {
    let mut completions = Command::new(bin());
    completions
        .arg("completions")
        .arg("bash")
        .env_remove("CURIO_DATA_DIR");
    let completions = completions.output().expect("run completions");

    assert!(completions.status.success());
    let stdout = String::from_utf8_lossy(&completions.stdout);
    assert!(stdout.contains("curio"));
}
