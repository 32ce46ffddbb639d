use std::io::{self, IsTerminal, Write};

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::calendar::CalendarHeatmap;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::grid::Grid;
use crate::hourly::HourlyHeatmap;
use crate::scatter::ScatterProjection;
use crate::timezone::ZoneEntry;

#[derive(Debug, Clone)]
pub struct Renderer {
    format: OutputFormat,
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config, format_override: Option<OutputFormat>) -> anyhow::Result<Self> {
        let format = match format_override {
            Some(format) => format,
            None => cfg
                .get("format")
                .unwrap_or_else(|| "text".to_string())
                .parse::<OutputFormat>()?,
        };
        let color = cfg.get_bool("color").unwrap_or(true);

        Ok(Self { format, color })
    }

    #[tracing::instrument(skip_all)]
    pub fn print_scatter(&mut self, projection: &ScatterProjection) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        if self.format == OutputFormat::Json {
            return write_json(&mut out, projection);
        }

        let rows = projection
            .points
            .iter()
            .map(|point| {
                vec![
                    point.date_label.clone(),
                    format!(
                        "{:02}:{:02}",
                        point.minute_of_day / 60,
                        point.minute_of_day % 60
                    ),
                    point.minute_of_day.to_string(),
                ]
            })
            .collect();

        write_table(
            &mut out,
            vec!["Date".to_string(), "Time".to_string(), "Minute".to_string()],
            rows,
        )
    }

    #[tracing::instrument(skip_all)]
    pub fn print_calendar(&mut self, heatmap: &CalendarHeatmap) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        if self.format == OutputFormat::Json {
            return write_json(&mut out, heatmap);
        }

        writeln!(
            out,
            "{} .. {} ({} weeks, {})",
            heatmap.window.first_column, heatmap.window.last_day, heatmap.window.weeks, heatmap.zone
        )?;
        self.print_grid(
            &mut out,
            &heatmap.grid,
            &heatmap.row_labels,
            &heatmap.column_labels,
        )?;
        writeln!(
            out,
            "{} events counted, {} outside the window",
            heatmap.grid.total(),
            heatmap.dropped
        )?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    pub fn print_hourly(&mut self, heatmap: &HourlyHeatmap) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        if self.format == OutputFormat::Json {
            return write_json(&mut out, heatmap);
        }

        writeln!(
            out,
            "{}-minute periods ({})",
            heatmap.period_minutes, heatmap.zone
        )?;
        self.print_grid(
            &mut out,
            &heatmap.grid,
            &heatmap.row_labels,
            &heatmap.column_labels,
        )
    }

    #[tracing::instrument(skip_all)]
    pub fn print_zones(&mut self, zones: &[&ZoneEntry]) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        if self.format == OutputFormat::Json {
            return write_json(&mut out, &zones);
        }

        for zone in zones {
            writeln!(out, "{}", zone.label)?;
        }
        Ok(())
    }

    fn print_grid<W: Write>(
        &self,
        out: &mut W,
        grid: &Grid,
        row_labels: &[String],
        column_labels: &[String],
    ) -> anyhow::Result<()> {
        let headers = std::iter::once(String::new())
            .chain(column_labels.iter().cloned())
            .collect();

        let rows = grid
            .iter_rows()
            .enumerate()
            .map(|(idx, cells)| {
                let label = row_labels.get(idx).cloned().unwrap_or_default();
                std::iter::once(label)
                    .chain(cells.iter().map(|&count| self.paint_count(count)))
                    .collect()
            })
            .collect();

        write_table(out, headers, rows)
    }

    fn paint_count(&self, count: u32) -> String {
        let text = count.to_string();
        if count == 0 {
            return text;
        }
        self.paint(&text, "32")
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || !io::stdout().is_terminal() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{strip_ansi, write_table};

    #[test]
    fn table_pads_to_visible_width() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            vec!["".to_string(), "Jan".to_string(), "".to_string()],
            vec![
                vec!["Mon".to_string(), "\x1b[32m12\x1b[0m".to_string(), "0".to_string()],
                vec!["".to_string(), "3".to_string(), "0".to_string()],
            ],
        )
        .expect("write table");

        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "    Jan   ");
        assert_eq!(lines[1], "--- --- - ");
        assert_eq!(strip_ansi(lines[2]), "Mon 12  0 ");
        assert_eq!(lines[3], "    3   0 ");
    }
}
