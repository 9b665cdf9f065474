use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::motion::{MotionAnalysis, Trajectory};

/// Helper function to render a chart with a one-line footer inside the same bordered box
pub fn render_chart_with_footer_inside(
    f: &mut Frame,
    area: Rect,
    datasets: Vec<Dataset>,
    x_axis: Axis,
    y_axis: Axis,
    title: Line,
    footer: Line,
) {
    // Get inner area (accounting for borders)
    let inner = if area.width > 2 && area.height > 2 {
        Rect {
            x: area.x + 1,
            y: area.y + 1,
            width: area.width.saturating_sub(2),
            height: area.height.saturating_sub(2),
        }
    } else {
        area
    };

    let chart_footer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(1)].as_ref())
        .split(inner);

    let chart = Chart::new(datasets)
        .x_axis(x_axis)
        .y_axis(y_axis)
        .hidden_legend_constraints((Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)));
    f.render_widget(chart, chart_footer[0]);

    f.render_widget(
        Paragraph::new(footer).alignment(Alignment::Center),
        chart_footer[1],
    );

    let block = Block::default().borders(Borders::ALL).title(title);
    f.render_widget(block, area);
}

/// Three evenly spaced tick labels.
fn axis_labels<'a>(bounds: [f64; 2], precision: usize) -> Vec<Span<'a>> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .into_iter()
        .map(|v| Span::raw(format!("{v:.precision$}")))
        .collect()
}

/// Distance-over-time plot with start, end and (if any) stop markers.
pub fn draw_trajectory(area: Rect, f: &mut Frame, analysis: &MotionAnalysis, traj: &Trajectory) {
    let start = [(0.0, 0.0)];
    let end = [traj.end];
    let stop: Vec<(f64, f64)> = traj.stop.into_iter().collect();

    let mut datasets = vec![
        Dataset::default()
            .name("S(t)")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&traj.points),
        Dataset::default()
            .name("start")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Green))
            .data(&start),
        Dataset::default()
            .name(format!("end ({:.2} m)", traj.end.1))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Scatter)
            .style(Style::default().fg(Color::Red))
            .data(&end),
    ];
    if let Some((t_stop, _)) = traj.stop {
        datasets.push(
            Dataset::default()
                .name(format!("stop (t = {t_stop:.2} s)"))
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(Color::Yellow))
                .data(&stop),
        );
    }

    let x_axis = Axis::default()
        .title("t, s")
        .style(Style::default().fg(Color::Gray))
        .bounds(traj.bounds.x)
        .labels(axis_labels(traj.bounds.x, 1));
    let y_axis = Axis::default()
        .title("S, m")
        .style(Style::default().fg(Color::Gray))
        .bounds(traj.bounds.y)
        .labels(axis_labels(traj.bounds.y, 1));

    let title = Line::from(vec![
        Span::styled(
            analysis.kind.label(),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(format!("  {}", analysis.equation)),
    ]);
    let footer = Line::from(vec![
        Span::styled("v", Style::default().fg(Color::Gray)),
        Span::raw(format!(" {:.2} m/s  ", analysis.v_end)),
        Span::styled("S", Style::default().fg(Color::Gray)),
        Span::raw(format!(" {:.2} m  ", analysis.distance)),
        Span::styled("q/Esc", Style::default().fg(Color::Magenta)),
        Span::raw(" quit"),
    ]);

    render_chart_with_footer_inside(f, area, datasets, x_axis, y_axis, title, footer);
}
