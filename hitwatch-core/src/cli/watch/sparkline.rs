const TICKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One character per value, scaled against the largest value.
///
/// Zero always renders as the lowest tick, so an idle window is visible as such.
pub fn sparkline(values: &[u64]) -> String {
    let max = values.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return TICKS[0].to_string().repeat(values.len());
    }

    let top = (TICKS.len() - 1) as f64;
    values
        .iter()
        .map(|&v| TICKS[((v as f64 / max as f64) * top).round() as usize])
        .collect()
}
