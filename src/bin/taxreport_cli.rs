use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;

use taxreport_rs::tree::TreeConfig;
use taxreport_rs::workflow::WorkflowType;
use taxreport_rs::build_report_view_from_files;

fn spinner(color: &str, msg: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&[
                "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
            ])
            .template(&format!("{{spinner:.{color}}} {{msg}}"))
            .expect("Invalid spinner template"),
    );
    bar.set_message(msg.to_string());
    bar
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let workflow_key = args.next().unwrap_or_else(|| {
        eprintln!("usage: taxreport-rs <workflow> <report.tsv[.gz]>...");
        std::process::exit(2);
    });
    let report_files: Vec<PathBuf> = args.map(PathBuf::from).collect();
    if report_files.is_empty() {
        eprintln!("usage: taxreport-rs <workflow> <report.tsv[.gz]>...");
        std::process::exit(2);
    }

    let workflow = WorkflowType::parse(&workflow_key).expect("Unknown workflow type");

    // 1. Spinner for loading report rows
    let bar = spinner("blue", "Loading report rows...");
    bar.finish_with_message(format!("Found {} report file(s).", report_files.len()));

    // 2. Spinner for building the tree
    let bar = spinner("green", "Building taxon tree...");
    let view = build_report_view_from_files(
        report_files,
        workflow,
        &TreeConfig::new(10, "nt_r"),
    )
    .expect("Building report view failed");
    bar.finish_with_message(format!(
        "Built tree with {} node(s), {} root(s).",
        view.tree.len(),
        view.tree.roots().len()
    ));

    // 3. Spinner for writing the text report
    let bar = spinner("yellow", "Writing report_tree.txt...");
    let metric = view.default_metric().unwrap_or("nt_r").to_string();
    fs::write("report_tree.txt", view.get_report_text(&metric))
        .expect("Could not write report_tree.txt");
    bar.finish_with_message("Output files created.");
}
