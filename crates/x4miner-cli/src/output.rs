//! Output formatting for command results.
//!
//! Every command produces a serializable summary from the library; this
//! module turns it into either colored text or pretty-printed JSON.

use std::fmt::Write as _;
use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use x4miner_lib::proximity::AxisOffset;
use x4miner_lib::{
    DealSummary, DistanceSummary, DuplicateCode, FactionStrength, Position, ProximityReport,
};

use crate::terminal::{format_credits, format_with_separators, ColorPalette};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// World position of a component, as reported by `locate`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LocationSummary {
    pub component: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector_name: Option<String>,
    pub position: Position,
}

/// Write any summary to stdout as pretty JSON followed by a newline.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value).map_err(io::Error::other)?;
    writeln!(handle)
}

/// Text renderer parameterized by a color palette.
pub struct TextRenderer {
    palette: ColorPalette,
}

impl TextRenderer {
    pub const fn new(palette: ColorPalette) -> Self {
        Self { palette }
    }

    pub fn deals(&self, deals: &[DealSummary]) -> String {
        let p = &self.palette;
        let mut out = String::new();
        if deals.is_empty() {
            let _ = writeln!(out, "No profitable trades found.");
            return out;
        }

        for deal in deals {
            let badge = if deal.illegal {
                format!(" {}ILLEGAL{}", p.tag_illegal, p.reset)
            } else {
                String::new()
            };
            let _ = writeln!(
                out,
                "{}#{}{} {}{}{}{badge}",
                p.tag_rank, deal.rank, p.reset, p.white_bold, deal.ware, p.reset
            );
            let _ = writeln!(
                out,
                "  buy  {} units at {}{}{} in {} ({})",
                format_with_separators(deal.quantity),
                p.white_bold,
                deal.seller.station.code,
                p.reset,
                deal.seller.station.sector_name,
                format_credits(deal.seller.price),
            );
            let _ = writeln!(
                out,
                "  sell at {}{}{} in {} ({})",
                p.white_bold,
                deal.buyer.station.code,
                p.reset,
                deal.buyer.station.sector_name,
                format_credits(deal.buyer.price),
            );
            let _ = writeln!(
                out,
                "  profit {}{}{} ({} per unit)",
                p.green,
                format_credits(deal.total_profit),
                p.reset,
                format_credits(deal.profit_per_unit),
            );
            let _ = write!(
                out,
                "  distance {}{:.1} km{}",
                p.cyan, deal.trade_distance_km, p.reset
            );
            if let Some(origin) = deal.origin_distance_km {
                let _ = write!(out, " {}(+{origin:.1} km pickup){}", p.gray, p.reset);
            }
            let _ = writeln!(out, " {}score {:.2}{}", p.gray, deal.score, p.reset);
            let _ = writeln!(
                out,
                "  route {}{}{}",
                p.orange,
                deal.route.join(" -> "),
                p.reset
            );
        }
        out
    }

    pub fn distance(&self, summary: &DistanceSummary) -> String {
        let p = &self.palette;
        let mut out = String::new();
        let _ = write!(
            out,
            "{}{}{} -> {}{}{}: ",
            p.white_bold, summary.from.code, p.reset, p.white_bold, summary.to.code, p.reset
        );
        match summary.distance_km {
            Some(km) => {
                let _ = writeln!(out, "{}{km:.1} km{}", p.cyan, p.reset);
                let _ = writeln!(
                    out,
                    "route {}{}{}",
                    p.orange,
                    summary.route.join(" -> "),
                    p.reset
                );
            }
            None => {
                let _ = writeln!(
                    out,
                    "{}unreachable{} while avoiding {} sectors",
                    p.red, p.reset, summary.variant
                );
            }
        }
        out
    }

    pub fn proximity(&self, report: &ProximityReport) -> String {
        let p = &self.palette;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}{}{} in {} at {}",
            p.white_bold, report.target, p.reset, report.sector_name, report.position
        );
        if report.stations.is_empty() {
            let _ = writeln!(out, "No other stations in this sector.");
        }
        for station in &report.stations {
            let _ = writeln!(
                out,
                "Closest station: {}{}{}, distance {}{:.0} km{}",
                p.white_bold, station.code, p.reset, p.cyan, station.distance_km.trunc(), p.reset
            );
            let _ = writeln!(out, "  location {}", station.position);
            write_offsets(&mut out, "Target", &station.target_offsets, p);
        }
        if let Some(player) = &report.player {
            let _ = writeln!(
                out,
                "The player is {}{:.0} km{} from the target",
                p.cyan,
                player.distance_km.trunc(),
                p.reset
            );
            write_offsets(&mut out, "Target", &player.target_offsets, p);
        }
        out
    }

    pub fn location(&self, summary: &LocationSummary) -> String {
        let p = &self.palette;
        let mut out = String::new();
        let _ = write!(out, "{}{}{}: {}", p.white_bold, summary.component, p.reset, summary.position);
        if let Some(name) = &summary.sector_name {
            let _ = write!(out, " in {name}");
        }
        let _ = writeln!(out);
        out
    }

    pub fn factions(&self, strengths: &[FactionStrength]) -> String {
        let p = &self.palette;
        let mut out = String::new();
        if strengths.is_empty() {
            let _ = writeln!(out, "No factions found.");
            return out;
        }

        let header = format!(
            "{:<16} {:>9} {:>9} {:>9}",
            "Faction", "Relation", "Sectors", "Stations"
        );
        let rule = "-".repeat(header.len());
        let _ = writeln!(out, "{rule}\n{header}\n{rule}");
        for strength in strengths {
            let relation = strength
                .relation
                .map_or_else(|| "-".to_string(), |r| format!("{r:.2}"));
            let colour = match strength.relation {
                Some(r) if r < 0.0 => p.red,
                Some(_) => p.green,
                None => p.gray,
            };
            let _ = writeln!(
                out,
                "{:<16} {colour}{relation:>9}{} {:>9} {:>9}",
                strength.faction, p.reset, strength.sectors, strength.stations
            );
        }
        let _ = writeln!(out, "{rule}");
        out
    }

    pub fn duplicates(&self, duplicates: &[DuplicateCode]) -> String {
        let p = &self.palette;
        let mut out = String::new();
        if duplicates.is_empty() {
            let _ = writeln!(out, "No duplicate station codes.");
            return out;
        }

        for duplicate in duplicates {
            let _ = writeln!(
                out,
                "{}{}{} is used by {} stations",
                p.white_bold,
                duplicate.code,
                p.reset,
                duplicate.stations.len()
            );
            for station in &duplicate.stations {
                let marker = if station.resolved { "*" } else { " " };
                let _ = writeln!(
                    out,
                    "  {marker} {} at {} owned by {}",
                    station.sector_name,
                    station.position,
                    station.owner.as_deref().unwrap_or("nobody"),
                );
            }
        }
        let _ = writeln!(out, "{}* station selected by code lookups{}", p.gray, p.reset);
        out
    }
}

fn write_offsets(out: &mut String, subject: &str, offsets: &[AxisOffset], p: &ColorPalette) {
    for offset in offsets {
        let preposition = match offset.direction {
            "above" | "below" => "",
            _ => "to the ",
        };
        let _ = writeln!(
            out,
            "  {subject} is {}{} km{} {preposition}{} ({} axis)",
            p.gray,
            offset.km,
            p.reset,
            offset.direction,
            offset.axis.to_ascii_uppercase()
        );
    }
}
