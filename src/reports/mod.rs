use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use image::Rgba;
use xray_cam::{Condition, ConditionResult, LikelihoodLabel, WeightTable};

fn label_color(label: LikelihoodLabel) -> Color {
    match label {
        LikelihoodLabel::VeryUnlikely | LikelihoodLabel::Unlikely => Color::Green,
        LikelihoodLabel::Uncertain => Color::Yellow,
        LikelihoodLabel::Likely | LikelihoodLabel::VeryLikely => Color::Red,
    }
}

fn hex(c: Rgba<u8>) -> String {
    let [r, g, b, a] = c.0;
    format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
}

pub fn print_results(results: &[ConditionResult]) {
    println!("\n🩻 === ANALYSIS RESULTS === 🩻");

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("#").add_attribute(Attribute::Bold),
        Cell::new("Condition").add_attribute(Attribute::Bold),
        Cell::new("Likelihood").fg(Color::Cyan),
        Cell::new("Label"),
        Cell::new("Colour"),
        Cell::new("Peak"),
    ]);

    for col in [0, 2, 5] {
        if let Some(c) = table.column_mut(col) {
            c.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (rank, r) in results.iter().enumerate() {
        let label = r.label();
        let (_, peak) = r.cam.min_max();
        table.add_row(vec![
            Cell::new(rank),
            Cell::new(r.condition).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.3}", r.score.likelihood)).fg(Color::Cyan),
            Cell::new(label).fg(label_color(label)),
            Cell::new(hex(r.color)),
            Cell::new(format!("{:.2}", peak)),
        ]);
    }

    println!("{table}");
}

pub fn print_weight_summary(weights: &WeightTable) {
    println!(
        "\n⚖️  === WEIGHT TABLE: {} rows x {} channels === ⚖️",
        weights.len(),
        weights.channels()
    );

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Condition").add_attribute(Attribute::Bold),
        Cell::new("Min"),
        Cell::new("Max"),
        Cell::new("Mean"),
        Cell::new("L2").fg(Color::Cyan),
    ]);

    for i in 1..=4 {
        if let Some(c) = table.column_mut(i) {
            c.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (idx, row) in weights.iter().enumerate() {
        let name = Condition::from_index(idx)
            .map(|c| c.to_string())
            .unwrap_or_else(|| format!("row {}", idx));
        let min = row.iter().copied().fold(f32::INFINITY, f32::min);
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = row.iter().sum::<f32>() / row.len() as f32;
        let l2 = row.iter().map(|w| w * w).sum::<f32>().sqrt();

        table.add_row(vec![
            Cell::new(name).add_attribute(Attribute::Bold),
            Cell::new(format!("{:.4}", min)),
            Cell::new(format!("{:.4}", max)),
            Cell::new(format!("{:.4}", mean)),
            Cell::new(format!("{:.4}", l2)).fg(Color::Cyan),
        ]);
    }

    println!("{table}");
}
