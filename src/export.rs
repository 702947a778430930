//! `markers` and `rows` commands: CSV exports of the filtered view.

use anyhow::{Context, Result};
use log::info;

use crate::{
    aggregate,
    cli::ExportArgs,
    filter::{self, FilterOutcome, FilteredView},
    io_utils,
    session::{self, NO_MATCHES_MESSAGE, Session},
};

pub fn execute_markers(args: &ExportArgs) -> Result<()> {
    export(args, |view, writer| {
        let markers = aggregate::markers(view);
        for marker in &markers {
            writer.serialize(marker).context("Writing marker row")?;
        }
        Ok(markers.len())
    })
}

pub fn execute_rows(args: &ExportArgs) -> Result<()> {
    export(args, |view, writer| {
        writer
            .write_record(view.dataset().headers())
            .context("Writing header row")?;
        let mut written = 0usize;
        for row in view.rows() {
            writer
                .write_record(
                    row.iter()
                        .map(|cell| cell.as_ref().map(|v| v.as_display()).unwrap_or_default()),
                )
                .with_context(|| format!("Writing row {}", written + 2))?;
            written += 1;
        }
        Ok(written)
    })
}

fn export<F>(args: &ExportArgs, write: F) -> Result<()>
where
    F: FnOnce(&FilteredView<'_>, &mut csv::Writer<Box<dyn std::io::Write>>) -> Result<usize>,
{
    let mut session = Session::open(&args.source)?;
    let dataset = session.dataset()?;
    let criteria = session::criteria(&args.filters, &dataset)?;
    let FilterOutcome::Rows(view) = filter::filter(&dataset, &criteria) else {
        println!("{NO_MATCHES_MESSAGE}");
        return Ok(());
    };

    let delimiter = args
        .output_delimiter
        .unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let mut writer = io_utils::open_csv_writer(args.output.as_deref(), delimiter)?;
    let written = write(&view, &mut writer)?;
    writer.flush().context("Flushing output")?;
    match args.output.as_deref() {
        Some(path) if !io_utils::is_dash(path) => {
            info!("Wrote {written} row(s) to {path:?}")
        }
        _ => info!("Wrote {written} row(s) to stdout"),
    }
    Ok(())
}
