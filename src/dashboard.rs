//! `summary`, `breakdown`, `report`, and `options` commands.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
};

use anyhow::{Context, Result};
use log::info;

use crate::{
    aggregate::{self, GroupMean, Summary},
    cli::{OptionsArgs, QueryArgs, ReportArgs},
    filter::{self, FilterOutcome, PRICE_SLIDER_STEP_THOUSANDS, PriceBounds, room_type_options},
    io_utils,
    report::DashboardReport,
    session::{self, NO_MATCHES_MESSAGE, Session},
    table::{self, Align},
};

pub fn execute_summary(args: &QueryArgs) -> Result<()> {
    let mut session = Session::open(&args.source)?;
    let dataset = session.dataset()?;
    let criteria = session::criteria(&args.filters, &dataset)?;
    let FilterOutcome::Rows(view) = filter::filter(&dataset, &criteria) else {
        println!("{NO_MATCHES_MESSAGE}");
        return Ok(());
    };
    let summary = aggregate::summary(&view);
    print_summary(&summary, &session.settings().currency_symbol);
    info!("Summarized {} of {} listing(s)", summary.count, dataset.len());
    Ok(())
}

pub fn execute_breakdown(args: &QueryArgs) -> Result<()> {
    let mut session = Session::open(&args.source)?;
    let dataset = session.dataset()?;
    let criteria = session::criteria(&args.filters, &dataset)?;
    let FilterOutcome::Rows(view) = filter::filter(&dataset, &criteria) else {
        println!("{NO_MATCHES_MESSAGE}");
        return Ok(());
    };
    let report = DashboardReport::build(&view);
    print_summary(&report.summary, &session.settings().currency_symbol);

    println!();
    println!("Room type distribution");
    let rows = report
        .room_type_distribution
        .iter()
        .map(|share| {
            vec![
                share.value.clone(),
                share.count.to_string(),
                format!("{}%", table::format_number(share.fraction * 100.0, 1)),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(
        &headers(&["room_type", "listings", "share"]),
        &rows,
        &[Align::Left, Align::Right, Align::Right],
    );

    for (title, series) in report.group_series() {
        println!();
        println!("{title}");
        print_group_means(series);
    }
    info!(
        "Rendered {} chart series for {} listing(s)",
        report.group_series().len() + 1,
        view.len()
    );
    Ok(())
}

pub fn execute_report(args: &ReportArgs) -> Result<()> {
    let mut session = Session::open(&args.source)?;
    let dataset = session.dataset()?;
    let criteria = session::criteria(&args.filters, &dataset)?;
    let FilterOutcome::Rows(view) = filter::filter(&dataset, &criteria) else {
        println!("{NO_MATCHES_MESSAGE}");
        return Ok(());
    };
    let report = DashboardReport::build(&view);

    let mut writer: Box<dyn Write> = match args.output.as_deref() {
        Some(path) if !io_utils::is_dash(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Creating report file {path:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    };
    if args.compact {
        serde_json::to_writer(&mut writer, &report).context("Writing report JSON")?;
    } else {
        serde_json::to_writer_pretty(&mut writer, &report).context("Writing report JSON")?;
    }
    writeln!(writer)?;
    writer.flush()?;
    info!(
        "Wrote dashboard report for {} listing(s) with {} marker(s)",
        report.summary.count,
        report.markers.len()
    );
    Ok(())
}

pub fn execute_options(args: &OptionsArgs) -> Result<()> {
    let mut session = Session::open(&args.source)?;
    let dataset = session.dataset()?;
    let bounds = PriceBounds::from_dataset(&dataset);
    let currency = &session.settings().currency_symbol;

    println!("Room types");
    let rows = room_type_options(&dataset)
        .into_iter()
        .map(|room| vec![room])
        .collect::<Vec<_>>();
    table::print_table(&headers(&["room_type"]), &rows, &[]);

    println!();
    println!("Price range");
    let rows = vec![
        vec![
            "minimum".to_string(),
            format!("{currency} {}", table::format_number(bounds.min as f64, 0)),
            bounds.min_thousands().to_string(),
        ],
        vec![
            "maximum".to_string(),
            format!("{currency} {}", table::format_number(bounds.max as f64, 0)),
            bounds.max_thousands().to_string(),
        ],
        vec![
            "step".to_string(),
            format!(
                "{currency} {}",
                table::format_number((PRICE_SLIDER_STEP_THOUSANDS * 1000) as f64, 0)
            ),
            PRICE_SLIDER_STEP_THOUSANDS.to_string(),
        ],
    ];
    table::print_table(
        &headers(&["bound", "nightly_rate", "thousands"]),
        &rows,
        &[Align::Left, Align::Right, Align::Right],
    );
    Ok(())
}

fn print_summary(summary: &Summary, currency: &str) {
    let price = summary
        .mean_price
        .map(|p| format!("{currency} {}", table::format_number(p, 0)))
        .unwrap_or_else(|| table::NOT_AVAILABLE.to_string());
    let occupancy = summary
        .mean_occupancy
        .map(|o| format!("{}%", table::format_number(o, 1)))
        .unwrap_or_else(|| table::NOT_AVAILABLE.to_string());
    let rows = vec![
        vec!["Listings".to_string(), summary.count.to_string()],
        vec!["Mean nightly rate".to_string(), price],
        vec!["Mean occupancy".to_string(), occupancy],
    ];
    table::print_table(
        &headers(&["metric", "value"]),
        &rows,
        &[Align::Left, Align::Right],
    );
}

fn print_group_means(series: &[GroupMean]) {
    let rows = series
        .iter()
        .map(|group| {
            vec![
                group.group.clone(),
                table::format_optional(group.mean, 2),
                group.count.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_table(
        &headers(&["group", "mean", "listings"]),
        &rows,
        &[Align::Left, Align::Right, Align::Right],
    );
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
