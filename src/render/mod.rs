//! Plain text rendering of a dashboard.
//!
//! Produces the human-readable report printed by `timelens report`. Each
//! dashboard area is a [`Section`] that can be selected on its own.

use std::io::Write;

use chrono::Weekday;
use clap::ValueEnum;

use crate::analytics::{ranking::first_max_by_key, Dashboard};
use crate::config::DisplayConfig;
use crate::error::Result;
use crate::model::format_hhmm;
use crate::util::{fixed, truncate_chars};

/// Message shown instead of a report when there are no timelogs.
pub const NO_DATA_MESSAGE: &str = "No timelogs found. Nothing to report.";

/// Width of the label column.
const LABEL_WIDTH: usize = 28;

/// Heatmap glyphs by intensity level.
const LEVEL_GLYPHS: [char; 5] = ['·', '░', '▒', '▓', '█'];

/// Dashboard areas of the text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Section {
    /// Headline figures.
    Overview,
    /// Hours per category.
    Categories,
    /// Hours per user.
    Users,
    /// Hours per week and user.
    Weekly,
    /// Daily activity heatmap.
    Heatmap,
    /// Sprint velocity.
    Sprints,
    /// Collaboration pairs and team sizes.
    Collaboration,
    /// Hours per issue by category.
    Complexity,
    /// Hour-of-day and weekday histograms.
    Productivity,
    /// Estimate deviation.
    Deviation,
}

impl Section {
    /// Every section in report order.
    pub const ALL: [Section; 10] = [
        Section::Overview,
        Section::Categories,
        Section::Users,
        Section::Weekly,
        Section::Heatmap,
        Section::Sprints,
        Section::Collaboration,
        Section::Complexity,
        Section::Productivity,
        Section::Deviation,
    ];
}

/// Plain text renderer for dashboards.
#[derive(Debug, Clone)]
pub struct TextRenderer {
    decimals: usize,
    top_collaborations: usize,
    top_issues: usize,
    sections: Vec<Section>,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

impl TextRenderer {
    /// Create a renderer for all sections.
    #[must_use]
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            decimals: display.decimal_places,
            top_collaborations: display.top_collaborations,
            top_issues: display.top_issues,
            sections: Section::ALL.to_vec(),
        }
    }

    /// Restrict output to the given sections. An empty list means all.
    #[must_use]
    pub fn with_sections(mut self, sections: &[Section]) -> Self {
        self.sections = if sections.is_empty() {
            Section::ALL.to_vec()
        } else {
            Section::ALL.into_iter().filter(|section| sections.contains(section)).collect()
        };
        self
    }

    /// Render into a string.
    pub fn render_to_string(&self, dashboard: &Dashboard) -> Result<String> {
        let mut buffer = Vec::new();
        self.render(&mut buffer, dashboard)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Render the selected sections.
    pub fn render<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        writeln!(writer, "TIME TRACKING REPORT")?;
        writeln!(writer, "{}", "-".repeat(60))?;
        writeln!(
            writer,
            "Data range: {} - {}",
            dashboard.range.first.format("%Y-%m-%d %H:%M"),
            dashboard.range.last.format("%Y-%m-%d %H:%M")
        )?;
        writeln!(
            writer,
            "Timelogs: {} used, {} skipped",
            dashboard.stats.timelogs_used,
            dashboard.stats.skipped()
        )?;

        for section in &self.sections {
            writeln!(writer)?;
            match section {
                Section::Overview => self.write_overview(writer, dashboard)?,
                Section::Categories => self.write_categories(writer, dashboard)?,
                Section::Users => self.write_users(writer, dashboard)?,
                Section::Weekly => self.write_weekly(writer, dashboard)?,
                Section::Heatmap => self.write_heatmap(writer, dashboard)?,
                Section::Sprints => self.write_sprints(writer, dashboard)?,
                Section::Collaboration => self.write_collaboration(writer, dashboard)?,
                Section::Complexity => self.write_complexity(writer, dashboard)?,
                Section::Productivity => self.write_productivity(writer, dashboard)?,
                Section::Deviation => self.write_deviation(writer, dashboard)?,
            }
        }
        Ok(())
    }

    fn hours(&self, hours: f64) -> String {
        format!("{}h", fixed(hours, self.decimals))
    }

    fn write_row<W: Write>(&self, writer: &mut W, indent: usize, label: &str, hours: f64) -> Result<()> {
        writeln!(
            writer,
            "{:indent$}{:<LABEL_WIDTH$} {:>10}",
            "",
            truncate_chars(label, LABEL_WIDTH),
            self.hours(hours)
        )?;
        Ok(())
    }

    fn write_overview<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        let overview = &dashboard.overview;
        writeln!(writer, "PROJECT OVERVIEW")?;
        writeln!(writer, "  Average velocity: {} per sprint", self.hours(overview.average_velocity))?;
        writeln!(writer, "  Active sprints: {}", overview.active_sprints)?;
        match &overview.main_focus {
            Some(focus) => writeln!(
                writer,
                "  Main focus: {} ({} per sprint)",
                focus.category,
                self.hours(focus.hours)
            )?,
            None => writeln!(writer, "  Main focus: none")?,
        }
        if let Some(sprint) = &overview.most_active_sprint {
            writeln!(
                writer,
                "  Most active sprint: #{} {} - {} ({})",
                sprint.number,
                sprint.start,
                sprint.end,
                self.hours(sprint.total_hours)
            )?;
        }
        writeln!(
            writer,
            "  Average completion time: {} over {} issues",
            self.hours(overview.average_completion_hours),
            overview.completed_issues
        )?;
        Ok(())
    }

    fn write_categories<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        writeln!(writer, "HOURS PER CATEGORY")?;
        for (category, hours) in &dashboard.category_totals {
            self.write_row(writer, 2, category, *hours)?;
        }
        Ok(())
    }

    fn write_users<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        writeln!(writer, "HOURS PER USER")?;
        for (user, hours) in &dashboard.user_totals {
            self.write_row(writer, 2, user, *hours)?;
        }
        self.write_row(writer, 2, "Total", dashboard.total_hours())?;
        Ok(())
    }

    fn write_weekly<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        writeln!(writer, "HOURS PER WEEK")?;
        for week in &dashboard.weekly_user_hours {
            writeln!(writer, "  {}", week.label)?;
            for (user, hours) in &week.users {
                self.write_row(writer, 4, user, *hours)?;
            }
        }
        Ok(())
    }

    fn write_heatmap<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        let heatmap = &dashboard.heatmap;
        writeln!(
            writer,
            "ACTIVITY HEATMAP ({} - {})",
            heatmap.window_start, heatmap.window_end
        )?;

        for (row, weekday) in crate::analytics::productivity::WEEKDAYS.iter().enumerate() {
            let cells: String = heatmap
                .weeks
                .iter()
                .map(|week| LEVEL_GLYPHS[usize::from(week[row].level.min(4))])
                .collect();
            writeln!(writer, "  {} {cells}", weekday_label(*weekday))?;
        }

        writeln!(writer, "  Active days: {}", heatmap.active_days())?;
        if let Some(day) = first_max_by_key(heatmap.days(), |day| day.seconds as f64).filter(|day| day.seconds > 0) {
            writeln!(writer, "  Busiest day: {} ({})", day.date, format_hhmm(day.seconds))?;
        }
        Ok(())
    }

    fn write_sprints<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        let velocity = &dashboard.velocity;
        writeln!(writer, "SPRINT VELOCITY ({}-day sprints)", velocity.length_days)?;
        for sprint in &velocity.sprints {
            writeln!(
                writer,
                "  #{:<3} {} - {} {:>10}  ({} logs)",
                sprint.number,
                sprint.start,
                sprint.end,
                self.hours(sprint.total_hours),
                sprint.log_count
            )?;
        }
        writeln!(writer, "  Average velocity: {}", self.hours(velocity.average_velocity))?;
        writeln!(writer, "  Category distribution (per sprint):")?;
        for share in &velocity.category_distribution {
            self.write_row(writer, 4, &share.category, share.hours)?;
        }
        Ok(())
    }

    fn write_collaboration<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        writeln!(writer, "COLLABORATION")?;
        let pairs = dashboard.top_collaborations(self.top_collaborations);
        if pairs.is_empty() {
            writeln!(writer, "  No shared issues")?;
        }
        for pair in pairs {
            writeln!(writer, "  {} <-> {}: {} shared issues", pair.source, pair.target, pair.count)?;
        }

        writeln!(writer, "  Team size per category:")?;
        for size in &dashboard.team_sizes {
            writeln!(
                writer,
                "    {:<LABEL_WIDTH$} {} members ({} issues, {} people)",
                truncate_chars(&size.category, LABEL_WIDTH),
                fixed(size.average_members, self.decimals),
                size.total_issues,
                size.total_members
            )?;
        }
        Ok(())
    }

    fn write_complexity<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        writeln!(writer, "ISSUE COMPLEXITY")?;
        for row in &dashboard.complexity {
            writeln!(
                writer,
                "  {:<LABEL_WIDTH$} {} per issue ({} issues, {} total)",
                truncate_chars(&row.category, LABEL_WIDTH),
                self.hours(row.average_hours),
                row.total_issues,
                self.hours(row.total_hours)
            )?;
        }
        Ok(())
    }

    fn write_productivity<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        let patterns = &dashboard.productivity;
        writeln!(writer, "PRODUCTIVITY")?;
        writeln!(
            writer,
            "  Peak hour: {:02}:00 ({})",
            patterns.peak_hour.hour,
            self.hours(patterns.peak_hour.hours)
        )?;
        writeln!(
            writer,
            "  Peak day: {} ({})",
            weekday_label(patterns.peak_day.weekday),
            self.hours(patterns.peak_day.hours)
        )?;
        writeln!(writer, "  Hours by weekday:")?;
        for bucket in &patterns.weekly {
            self.write_row(writer, 4, weekday_label(bucket.weekday), bucket.hours)?;
        }
        writeln!(writer, "  Hours by time of day:")?;
        for bucket in patterns.hourly.iter().filter(|bucket| bucket.hours != 0.0) {
            self.write_row(writer, 4, &format!("{:02}:00", bucket.hour), bucket.hours)?;
        }
        Ok(())
    }

    fn write_deviation<W: Write>(&self, writer: &mut W, dashboard: &Dashboard) -> Result<()> {
        let report = &dashboard.deviations;
        writeln!(writer, "ESTIMATE DEVIATION")?;
        let issues = dashboard.top_deviations(self.top_issues);
        if issues.is_empty() {
            writeln!(writer, "  No estimated or booked issues")?;
        }
        for issue in issues {
            writeln!(
                writer,
                "  #{} {} [{}] est {} actual {} {:.prec$} {}",
                issue.iid,
                truncate_chars(&issue.title, 40),
                issue.category,
                self.hours(issue.estimate_hours),
                self.hours(issue.actual_hours),
                issue.deviation,
                issue.rating.as_str(),
                prec = self.decimals
            )?;
        }

        writeln!(writer, "  Estimated vs actual per category:")?;
        for (estimate, average) in report.by_category.iter().zip(&report.average_by_category) {
            writeln!(
                writer,
                "    {:<LABEL_WIDTH$} {} / {} (avg deviation {}%)",
                truncate_chars(&estimate.category, LABEL_WIDTH),
                self.hours(estimate.estimated_hours),
                self.hours(estimate.actual_hours),
                fixed(average.average_percent, self.decimals)
            )?;
        }
        Ok(())
    }
}

fn weekday_label(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::MetricsEngine;
    use crate::model::{Issue, Snapshot, Timelog};
    use chrono::{NaiveDate, Utc};

    fn dashboard() -> Dashboard {
        let issue = Issue::new("5", ["Entwurf"]).with_title("Login page");
        let snapshot = Snapshot::new(
            vec![issue.clone().with_times(3600, 5400)],
            vec![
                Timelog::new("Alice", issue.clone(), "2024-03-04T10:00:00Z", 3600),
                Timelog::new("Bob", issue, "2024-03-05T14:00:00Z", 1800),
            ],
        );
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        match MetricsEngine::default().compute(&snapshot, &Utc, today) {
            crate::analytics::Report::Ready(dashboard) => *dashboard,
            crate::analytics::Report::NoData => panic!("expected data"),
        }
    }

    #[test]
    fn test_section_filter_keeps_report_order() {
        let renderer = TextRenderer::default().with_sections(&[Section::Deviation, Section::Overview]);
        assert_eq!(renderer.sections, vec![Section::Overview, Section::Deviation]);
    }

    #[test]
    fn test_render_overview() {
        let text = TextRenderer::default()
            .with_sections(&[Section::Overview])
            .render_to_string(&dashboard())
            .unwrap();

        assert!(text.starts_with("TIME TRACKING REPORT\n"));
        assert!(text.contains("Data range: 2024-03-04 10:00 - 2024-03-05 14:00"));
        assert!(text.contains("  Main focus: Entwurf (1.50h per sprint)"));
        assert!(text.contains("  Most active sprint: #1 2024-03-04 - 2024-03-11 (1.50h)"));
        assert!(text.contains("  Average completion time: 1.50h over 1 issues"));
        assert!(!text.contains("HOURS PER CATEGORY"));
    }

    #[test]
    fn test_render_deviation_and_collaboration() {
        let text = TextRenderer::default()
            .with_sections(&[Section::Collaboration, Section::Deviation])
            .render_to_string(&dashboard())
            .unwrap();

        assert!(text.contains("  Alice <-> Bob: 1 shared issues"));
        assert!(text.contains("#5 Login page [Entwurf] est 1.00h actual 1.50h +50.00% poor"));
    }

    #[test]
    fn test_render_heatmap_rows() {
        let text = TextRenderer::default()
            .with_sections(&[Section::Heatmap])
            .render_to_string(&dashboard())
            .unwrap();

        assert!(text.contains("  Active days: 2"));
        assert!(text.contains("  Busiest day: 2024-03-04 (01:00h)"));
        let rows = text.lines().filter(|line| line.starts_with("  Sun ") || line.starts_with("  Sat ")).count();
        assert_eq!(rows, 2);
    }
}
