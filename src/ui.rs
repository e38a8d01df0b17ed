use crate::analysis::whatif::Input;
use crate::analysis::{ScatterPlot, DEATHS_LABEL, REGRESSION_ALL_THREE, REGRESSION_TWO};
use crate::app::{App, Tab};
use crate::braille::BrailleCanvas;
use crate::detail::{tooltip_origin, DetailView};
use crate::map::geometry::fill_wedge;
use crate::map::{draw_borders, NO_DATA_FILL};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Chart, Clear, Dataset as ChartData, GraphType, LineGauge, Paragraph,
        Tabs, Widget,
    },
    Frame,
};

/// Gradient cells in the legend strip
const LEGEND_STEPS: u16 = 20;

const TOOLTIP_SIZE: (u16, u16) = (44, 10);
/// Pie width in cells; braille pixels are square at a 1:2 cell aspect
const PIE_COLS: u16 = 12;

const BORDER_COLOR: Color = Color::White;

/// Header, body, slider and status rows
fn screen_areas(area: Rect) -> [Rect; 4] {
    Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area)
}

/// Map block and legend row inside the body
fn map_areas(body: Rect) -> [Rect; 2] {
    Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(body)
}

fn map_block() -> Block<'static> {
    Block::bordered()
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Positive Percentage by State ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))
}

/// Cells the map itself covers for a screen of `area`
pub fn map_area(area: Rect) -> Rect {
    let [_, body, _, _] = screen_areas(area);
    let [map, _] = map_areas(body);
    map_block().inner(map)
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let [header, body, slider, status] = screen_areas(frame.area());

    render_tabs(frame, app, header);
    match app.tab {
        Tab::Map => render_map_tab(frame, app, body),
        Tab::Exploratory => render_exploratory(frame, app, body),
        Tab::WhatIf => render_whatif(frame, app, body),
    }
    render_slider(frame, app, slider);
    render_status_bar(frame, app, status);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| format!("{} {}", i + 1, tab.title()));
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn render_map_tab(frame: &mut Frame, app: &App, area: Rect) {
    let [map, legend] = map_areas(area);
    let block = map_block();
    let inner = block.inner(map);
    frame.render_widget(block, map);
    frame.render_widget(MapWidget { app }, inner);
    render_legend(frame, app, legend);

    if let Some(view) = app.detail.view() {
        render_tooltip(frame, view, inner);
    }
}

/// Choropleth fills as cell backgrounds with braille state borders on top
struct MapWidget<'a> {
    app: &'a App,
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let choropleth = &self.app.choropleth;

        for (row, cells) in self.app.raster.iter().enumerate().take(area.height as usize) {
            let y = area.y + row as u16;
            for (col, region) in cells.iter().enumerate().take(area.width as usize) {
                if let Some(fill) = region.and_then(|idx| choropleth.fill(idx)) {
                    buf[(area.x + col as u16, y)].set_bg(fill);
                }
            }
        }

        let mut canvas = BrailleCanvas::new(area.width as usize, area.height as usize);
        draw_borders(&mut canvas, &self.app.dataset.boundaries, &self.app.viewport);
        for (col, row, ch) in canvas.glyphs() {
            buf[(area.x + col, area.y + row)].set_char(ch).set_fg(BORDER_COLOR);
        }
    }
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let scale = app.choropleth.scale();
    let (lo, hi) = scale.domain();

    let mut spans = vec![
        Span::styled(" Positive % ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{} ", format_pct(lo))),
    ];
    spans.extend((0..LEGEND_STEPS).map(|i| {
        let value = lo + (hi - lo) * (i as f64 + 0.5) / LEGEND_STEPS as f64;
        Span::styled(" ", Style::default().bg(scale.color(value)))
    }));
    spans.push(Span::raw(format!(" {}+", format_pct(hi))));
    spans.push(Span::raw("   "));
    spans.push(Span::styled("  ", Style::default().bg(NO_DATA_FILL)));
    spans.push(Span::styled(" no data", Style::default().fg(Color::DarkGray)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn format_pct(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}%")
    } else {
        format!("{value:.1}%")
    }
}

fn render_tooltip(frame: &mut Frame, view: &DetailView, map: Rect) {
    let bounds = (map.x, map.y, map.width, map.height);
    let (x, y) = tooltip_origin(view.anchor, TOOLTIP_SIZE, bounds);
    let area = Rect::new(x, y, TOOLTIP_SIZE.0, TOOLTIP_SIZE.1).intersection(frame.area());
    if area.is_empty() {
        return;
    }

    let block = Block::bordered()
        .border_style(Style::default().fg(Color::Gray))
        .title(Span::styled(
            format!(" {} ", view.region),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(format!(" {} ", view.date)).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let [pie, text] = Layout::horizontal([Constraint::Length(PIE_COLS), Constraint::Min(1)]).areas(inner);
    render_pie(frame.buffer_mut(), view, pie);

    let slices = view.breakdown.slices();
    let mut lines = vec![
        Line::from(format!("Population:     {}", group_digits(view.population))),
        Line::from(format!("Positive cases: {}", group_digits(view.positive_cases))),
        Line::from(format!("Death cases:    {}", group_digits(view.death_cases))),
        Line::raw(""),
    ];
    lines.extend(slices.iter().map(|slice| {
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(slice.color)),
            Span::raw(format!("{:<13}{:>6.2}%", slice.label, slice.value)),
        ])
    }));
    frame.render_widget(Paragraph::new(lines), text);
}

/// One braille layer per slice so each keeps its own color
fn render_pie(buf: &mut Buffer, view: &DetailView, area: Rect) {
    let (px_w, px_h) = (area.width as i32 * 2, area.height as i32 * 4);
    let radius = (px_w.min(px_h) / 2 - 1).max(1);
    let center = (px_w / 2, px_h / 2);

    for slice in view.breakdown.slices() {
        let mut canvas = BrailleCanvas::new(area.width as usize, area.height as usize);
        fill_wedge(&mut canvas, center, radius, slice.start_angle, slice.end_angle);
        for (col, row, ch) in canvas.glyphs() {
            let cell = &mut buf[(area.x + col, area.y + row)];
            // Cells shared by two slices keep the later glyph
            cell.set_char(ch).set_fg(slice.color);
        }
    }
}

/// 1234567 -> "1,234,567"
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn render_exploratory(frame: &mut Frame, app: &App, area: Rect) {
    let [charts, summaries] = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let chart_areas: [Rect; 3] = Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(charts);
    for (plot, chart_area) in app.scatter.iter().zip(chart_areas) {
        render_scatter(frame, plot, chart_area);
    }

    let [all_three, two] = Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(summaries);
    for (text, title, summary_area) in [
        (REGRESSION_ALL_THREE, " Three-variable model ", all_three),
        (REGRESSION_TWO, " Two-variable model ", two),
    ] {
        let paragraph = Paragraph::new(text).block(
            Block::bordered()
                .border_style(Style::default().fg(Color::DarkGray))
                .title(title),
        );
        frame.render_widget(paragraph, summary_area);
    }
}

fn render_scatter(frame: &mut Frame, plot: &ScatterPlot, area: Rect) {
    let label = plot.covariate.label();
    let data = ChartData::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Scatter)
        .style(Style::default().fg(Color::Cyan))
        .data(&plot.points);

    let axis_style = Style::default().fg(Color::DarkGray);
    let chart = Chart::new(vec![data])
        .block(
            Block::bordered()
                .border_style(axis_style)
                .title(format!(" {label} vs {DEATHS_LABEL} ")),
        )
        .x_axis(
            Axis::default()
                .title(label)
                .style(axis_style)
                .bounds(plot.x_bounds)
                .labels(plot.x_labels().into_iter().map(Span::from).collect::<Vec<_>>()),
        )
        .y_axis(
            Axis::default()
                .title(DEATHS_LABEL)
                .style(axis_style)
                .bounds(plot.y_bounds)
                .labels(plot.y_labels().into_iter().map(Span::from).collect::<Vec<_>>()),
        );
    frame.render_widget(chart, area);
}

fn render_whatif(frame: &mut Frame, app: &App, area: Rect) {
    let [inputs, chart] = Layout::horizontal([Constraint::Length(44), Constraint::Min(20)]).areas(area);
    let whatif = &app.whatif;
    let projections = whatif.project();

    let field = |input: Input, label: &str, value: f64| {
        let focused = whatif.focus == Some(input);
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(if focused { "> " } else { "  " }, style),
            Span::styled(format!("{label:<28}{value:>+6.0}%"), style),
        ])
    };

    let mut lines = vec![
        field(Input::Physicians, "Physicians per 1000", whatif.physicians_change_pct),
        field(Input::Expenditure, "Health expenditure per capita", whatif.expenditure_change_pct),
        Line::raw(""),
        Line::styled(
            format!("{:<12}{:>10}{:>10}", "State", "Old rate", "New rate"),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    lines.extend(
        projections
            .iter()
            .map(|p| Line::from(format!("{:<12}{:>10.2}{:>10.2}", p.state, p.old_rate, p.new_rate))),
    );
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Up/Down: field  Left/Right: -/+1%  r: reset",
        Style::default().fg(Color::DarkGray),
    ));

    let panel = Paragraph::new(lines).block(
        Block::bordered()
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Change in resources "),
    );
    frame.render_widget(panel, inputs);

    let old_style = Style::default().fg(Color::Rgb(0x1f, 0x77, 0xb4));
    let new_style = Style::default().fg(Color::Rgb(0xff, 0x7f, 0x0e));
    let mut bars = BarChart::default()
        .block(
            Block::bordered()
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Deaths per 100000: old vs new "),
        )
        .bar_width(7)
        .bar_gap(1)
        .group_gap(3);
    for p in &projections {
        // Bar heights are integers; scale by 100 to keep two decimals
        let group = BarGroup::default().label(Line::from(p.state)).bars(&[
            Bar::default()
                .value(rate_height(p.old_rate))
                .text_value(format!("{:.2}", p.old_rate))
                .style(old_style),
            Bar::default()
                .value(rate_height(p.new_rate))
                .text_value(format!("{:.2}", p.new_rate))
                .style(new_style),
        ]);
        bars = bars.data(group);
    }
    frame.render_widget(bars, chart);
}

fn rate_height(rate: f64) -> u64 {
    (rate.max(0.0) * 100.0).round() as u64
}

fn render_slider(frame: &mut Frame, app: &App, area: Rect) {
    let index = app.selection.date_index();
    let last = app.dates.len().saturating_sub(1);
    let ratio = if last == 0 { 1.0 } else { index as f64 / last as f64 };
    let date = app
        .current_date()
        .map(|d| d.to_string())
        .unwrap_or_else(|_| "-".to_string());

    let gauge = LineGauge::default()
        .ratio(ratio)
        .label(format!(" {date} [{}/{}] ", index + 1, app.dates.len()))
        .filled_style(Style::default().fg(Color::Cyan))
        .unfilled_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(gauge, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | State: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.hovered().unwrap_or("-").to_string(), Style::default().fg(Color::Cyan)),
    ];
    if let Some(err) = &app.last_error {
        spans.push(Span::styled(" | ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(err.clone(), Style::default().fg(Color::Red)));
    }
    spans.push(Span::styled(
        " | ←/→:day PgUp/PgDn:week wasd:pan +/-:zoom 1-3:tab q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
