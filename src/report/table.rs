use crate::stats::GenerationSummary;

const HEADERS: [&str; 8] = [
    "Lane",
    "Generation",
    "Specie",
    "Speed",
    "Damage",
    "Protection",
    "Remaining Health",
    "Turns",
];

/// Pipe-format table of summaries, sorted by lane then generation
pub fn render_table(summaries: &[GenerationSummary]) -> String {
    let mut rows: Vec<&GenerationSummary> = summaries.iter().collect();
    rows.sort_by_key(|s| (s.lane, s.generation));

    let cells: Vec<[String; 8]> = rows
        .iter()
        .map(|s| {
            [
                // Lanes are shown 1-based
                (s.lane.0 + 1).to_string(),
                s.generation.0.to_string(),
                s.specie.to_string(),
                format!("{:.2}", s.speed),
                format!("{:.2}", s.damage),
                format!("{:.2}", s.protection),
                format!("{:.2}", s.winner_remaining_health),
                format!("{:.2}", s.turns),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, HEADERS.iter().copied(), &widths, false);
    push_separator(&mut out, &widths);
    for row in &cells {
        push_row(&mut out, row.iter().map(String::as_str), &widths, true);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize; 8], numeric: bool) {
    out.push('|');
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        // Specie is the only text column in body rows
        if numeric && i != 2 {
            out.push_str(&format!(" {:>width$} |", cell, width = *width));
        } else {
            out.push_str(&format!(" {:<width$} |", cell, width = *width));
        }
    }
    out.push('\n');
}

fn push_separator(out: &mut String, widths: &[usize; 8]) {
    out.push('|');
    for (i, width) in widths.iter().enumerate() {
        let dashes = "-".repeat(*width);
        if i == 2 {
            out.push_str(&format!(":{}-|", dashes));
        } else {
            out.push_str(&format!("-{}:|", dashes));
        }
    }
    out.push('\n');
}
