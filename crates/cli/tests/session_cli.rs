use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;

use cyclecount_cli::{AppContext, CycleCountConfig, OutputFormat, commands, session::run_session};
use cyclecount_infra::{CHART_HEIGHT, ScriptedScanner, chart_width};

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

/// Inventory of A (10), 1001 (5), C (7) with one passthrough column.
fn write_inventory(path: &Path) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "SKU").unwrap();
    sheet.write_string(0, 1, "SystemQty").unwrap();
    sheet.write_string(0, 2, "Location").unwrap();
    let rows: [(&str, f64, &str); 3] = [("A", 10.0, "Aisle 1"), ("1001", 5.0, "Aisle 2"), ("C", 7.0, "Aisle 3")];
    for (i, (sku, qty, loc)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        if *sku == "1001" {
            sheet.write_number(r, 0, 1001.0).unwrap();
        } else {
            sheet.write_string(r, 0, *sku).unwrap();
        }
        sheet.write_number(r, 1, *qty).unwrap();
        sheet.write_string(r, 2, *loc).unwrap();
    }
    workbook.save(path).unwrap();
}

/// Single-day plan, so the active batch is the whole inventory.
fn context(dir: &Path, output: OutputFormat) -> AppContext {
    let inventory = dir.join("inventory.xlsx");
    write_inventory(&inventory);
    let config = CycleCountConfig {
        inventory_path: inventory,
        output_dir: dir.to_path_buf(),
        days: 1,
        ..CycleCountConfig::default()
    };
    AppContext::new(config, output).unwrap()
}

fn run(ctx: &mut AppContext, script: &str, scanner: &mut ScriptedScanner) -> (String, cyclecount_inventory::CountSession) {
    let mut out = Vec::new();
    let session = run_session(ctx, date(), Cursor::new(script.to_string()), &mut out, scanner).unwrap();
    (String::from_utf8(out).unwrap(), session)
}

fn report_rows(path: &Path) -> Vec<Vec<Data>> {
    let mut workbook = open_workbook_auto(path).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    range.rows().map(|r| r.to_vec()).collect()
}

#[test]
fn session_scans_counts_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), OutputFormat::Table);
    let mut scanner = ScriptedScanner::new([Some("1001")]);

    let (out, session) = run(
        &mut ctx,
        "scan\ncount 7\ncount A 10\ncount ZZZ 1\nlist\nreport\nquit\ncount C 1\n",
        &mut scanner,
    );

    assert!(out.contains("Day 1/1"), "{out}");
    assert!(out.contains("Session opened "), "{out}");
    assert!(out.contains("for day 1 of 1."), "{out}");
    assert!(session.opened_at() <= chrono::Utc::now());
    assert!(out.contains("Scanned: 1001"), "{out}");
    assert!(out.contains("Recorded: 1001 - 7"), "{out}");
    assert!(out.contains("note: ZZZ is not in today's batch"), "{out}");
    assert!(out.contains("Accuracy: 50.00%"), "{out}");
    assert!(out.contains("Not in today's batch (left out of the report): ZZZ"), "{out}");

    // Input after `quit` is never read.
    assert_eq!(session.counted().len(), 3);

    assert!(dir.path().join("cycle_count_list_2026-10-19.xlsx").exists());
    let chart = image::open(dir.path().join("inventory_report.png")).unwrap();
    assert_eq!((chart.width(), chart.height()), (chart_width(3), CHART_HEIGHT));

    let rows = report_rows(&dir.path().join("cycle_count_final_2026-10-19.xlsx"));
    assert_eq!(rows.len(), 4);
    let by_sku: Vec<(String, Data)> = rows[1..].iter().map(|r| (r[0].to_string(), r[3].clone())).collect();
    assert!(by_sku.contains(&("1001".to_string(), Data::Float(2.0))));
    assert!(by_sku.contains(&("A".to_string(), Data::Float(0.0))));
    assert!(by_sku.contains(&("C".to_string(), Data::Empty)));
}

#[test]
fn empty_session_report_shows_zero_accuracy() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), OutputFormat::Table);
    let mut scanner = ScriptedScanner::default();

    let (out, session) = run(&mut ctx, "report\n", &mut scanner);

    assert!(session.counted().is_empty());
    assert!(out.contains("Accuracy: 0.00% (0 of 0 counted SKU(s) match; 3 not counted)"), "{out}");
    assert!(dir.path().join("cycle_count_final_2026-10-19.xlsx").exists());
}

#[test]
fn bad_input_is_reported_without_ending_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), OutputFormat::Table);
    let mut scanner = ScriptedScanner::new([None::<&str>]);

    let (out, session) = run(
        &mut ctx,
        "count 5\nscan\ncount A lots\ncount A -3\ndance\ncount A 3\ncount A 4\nreset\ncount C 7\n",
        &mut scanner,
    );

    assert!(out.contains("error: validation failed: no SKU entered or scanned"), "{out}");
    assert!(out.contains("No barcode read."), "{out}");
    assert!(out.contains("quantity 'lots' is not a whole number"), "{out}");
    assert!(out.contains("cannot be negative"), "{out}");
    assert!(out.contains("Unknown command 'dance'"), "{out}");
    assert!(out.contains("Session reset; 2 count(s) discarded."), "{out}");

    let counts: Vec<(&str, i64)> = session
        .counted()
        .iter()
        .map(|c| (c.sku.as_str(), c.counted_qty))
        .collect();
    assert_eq!(counts, vec![("C", 7)]);
}

#[test]
fn export_failure_keeps_the_displayed_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), OutputFormat::Table);
    let mut scanner = ScriptedScanner::default();

    // Daily list export succeeds, then the output directory disappears.
    let script = "count A 9\nreport\nlist\n";
    let batch = ctx.daily_batch(date()).unwrap();
    ctx.config.output_dir = dir.path().join("gone");

    let mut out = Vec::new();
    let err = commands::produce_report(&ctx, &batch, &[], &mut out).unwrap_err();
    assert!(format!("{err:#}").contains("report export failed"));
    assert!(String::from_utf8(out).unwrap().contains("Accuracy: 0.00%"));

    let (out, session) = run(&mut ctx, script, &mut scanner);
    assert!(out.contains("error: daily list export failed"), "{out}");
    assert!(out.contains("error: report export failed"), "{out}");
    assert!(out.contains("Accuracy: 0.00% (0 of 1 counted SKU(s) match; 2 not counted)"), "{out}");
    assert_eq!(session.counted().len(), 1);
}

#[test]
fn plan_command_prints_batch_and_writes_list() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), OutputFormat::Json);

    let mut out = Vec::new();
    let batch = commands::plan(&mut ctx, date(), &mut out).unwrap();
    assert_eq!(batch.records.len(), 3);

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["day"], 1);
    assert_eq!(json["records"].as_array().unwrap().len(), 3);
    assert!(dir.path().join("cycle_count_list_2026-10-19.xlsx").exists());
}

#[test]
fn plan_is_stable_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let inventory = dir.path().join("inventory.xlsx");
    write_inventory(&inventory);
    let config = CycleCountConfig {
        inventory_path: inventory,
        output_dir: dir.path().to_path_buf(),
        days: 2,
        ..CycleCountConfig::default()
    };

    let skus = |config: &CycleCountConfig| {
        let mut ctx = AppContext::new(config.clone(), OutputFormat::Table).unwrap();
        let batch = ctx.daily_batch(date()).unwrap();
        batch.records.iter().map(|r| r.sku.to_string()).collect::<Vec<_>>()
    };
    assert_eq!(skus(&config), skus(&config));
}

#[test]
fn report_command_reads_counts_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), OutputFormat::Json);

    let counts = dir.path().join("counts.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "SKU").unwrap();
    sheet.write_string(0, 1, "CountedQty").unwrap();
    sheet.write_string(1, 0, "C").unwrap();
    sheet.write_number(1, 1, 4.0).unwrap();
    sheet.write_number(2, 0, 1001.0).unwrap();
    sheet.write_number(2, 1, 5.0).unwrap();
    workbook.save(&counts).unwrap();

    let mut out = Vec::new();
    let files = commands::report(&mut ctx, date(), &counts, &mut out).unwrap();
    assert!(files.workbook.exists());
    assert!(files.chart.exists());

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["summary"]["counted"], 2);
    assert_eq!(json["summary"]["accuracy"], 50.0);
    assert_eq!(json["summary"]["shortages"][0]["sku"], "C");
    assert_eq!(json["summary"]["shortages"][0]["variance"], -3);
}

#[test]
fn missing_inventory_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let config = CycleCountConfig {
        inventory_path: dir.path().join("absent.xlsx"),
        output_dir: dir.path().to_path_buf(),
        ..CycleCountConfig::default()
    };
    let mut ctx = AppContext::new(config, OutputFormat::Table).unwrap();
    let err = ctx.daily_batch(date()).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load inventory"));
}

#[test]
fn typed_sku_keeps_inner_spacing() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path(), OutputFormat::Table);
    let mut scanner = ScriptedScanner::default();

    let (out, session) = run(&mut ctx, "count Blue  Widget 2\n", &mut scanner);

    assert!(out.contains("Recorded: Blue  Widget - 2"), "{out}");
    assert_eq!(session.counted()[0].sku.as_str(), "Blue  Widget");
}
