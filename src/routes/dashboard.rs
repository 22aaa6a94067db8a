// Server-rendered dashboard: one table row per site plus a totals row.

use std::collections::HashMap;

use crate::models::{MetricPair, Snapshot, TodayRecord};

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn trend(percent: Option<f64>) -> String {
    match percent {
        Some(p) => format!("{:+.1}%", p),
        None => "n/a".into(),
    }
}

fn pair_cells(p: &MetricPair) -> String {
    format!("<td>{}</td><td>{}</td>", p.total, p.organic)
}

const HEAD: &str = "<!doctype html><html><head><meta charset=\"utf-8\"><title>Sessions</title></head><body>";

/// `today` overrides the snapshot's today values by property id (fresh per-render refresh).
pub(super) fn render(snapshot: &Snapshot, today: &[TodayRecord]) -> String {
    let today_by_id: HashMap<&str, MetricPair> = today
        .iter()
        .map(|r| (r.property.id.as_str(), r.today))
        .collect();

    let mut html = String::from(HEAD);
    html.push_str("<h1>Sessions</h1><table><thead><tr><th>Site</th>");
    html.push_str("<th>Today</th><th>Today organic</th>");
    html.push_str("<th>Yesterday</th><th>Yesterday organic</th>");
    html.push_str("<th>30 days</th><th>30 days organic</th><th>Trend</th><th>Organic trend</th>");
    html.push_str("</tr></thead><tbody>");

    let mut today_sum = MetricPair::default();
    for r in &snapshot.aggregate {
        let today_pair = today_by_id
            .get(r.property.id.as_str())
            .copied()
            .unwrap_or(r.today);
        today_sum = today_sum + today_pair;
        html.push_str(&format!(
            "<tr><td>{}</td>{}{}<td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&r.property.name),
            pair_cells(&today_pair),
            pair_cells(&r.yesterday),
            r.monthly.total,
            r.monthly.organic,
            trend(r.monthly.total_trend_percent()),
            trend(r.monthly.organic_trend_percent()),
        ));
    }

    let sums = &snapshot.sums;
    html.push_str(&format!(
        "<tr><th>All</th>{}{}<td>{}</td><td>{}</td><td></td><td></td></tr>",
        pair_cells(&today_sum),
        pair_cells(&sums.yesterday),
        sums.monthly.total,
        sums.monthly.organic,
    ));
    html.push_str(&format!(
        "</tbody></table><p>Generated {} from {:?}.</p></body></html>",
        snapshot.generated_at.format("%Y-%m-%d %H:%M"),
        snapshot.source,
    ));
    html
}

pub(super) fn render_unavailable(reason: &str) -> String {
    format!(
        "{}<h1>Not ready</h1><p>{}</p></body></html>",
        HEAD,
        escape(reason)
    )
}
