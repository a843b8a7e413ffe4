use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

fn key_line(keys: &str, what: &str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{keys:<12}"), Style::default().fg(Color::Magenta)),
        Span::raw(what.to_string()),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        key_line("q / Ctrl-C", "Quit"),
        key_line("tab", "Next page"),
        key_line("?", "Show this help"),
        key_line("t", "Cycle theme (light, dark, system)"),
        key_line("a", "Sign in"),
        key_line("L", "Sign out"),
        key_line("e", "Edit the highlighted field (Enter or Esc to finish)"),
        Line::from(""),
        Line::from("Home:"),
        key_line("n", "Start a new application"),
        key_line("Enter", "Next step / generate"),
        key_line("f / i", "Edit resume file path / known resume id"),
        key_line("s", "Cycle job board"),
        key_line("o", "Cycle output type"),
        key_line("Esc", "Close the wizard"),
        Line::from(""),
        Line::from("Results, dashboard, templates:"),
        key_line("↑/↓ or j/k", "Move selection"),
        key_line("←/→ or h/l", "Switch dashboard section"),
        key_line("Enter", "Open selected record"),
        key_line("y", "Copy to clipboard"),
        key_line("/", "Search templates"),
        key_line("Esc", "Back from a record"),
        Line::from(""),
        Line::from("ATS and skill gap:"),
        key_line("Enter", "Next / analyze"),
        key_line("f", "Edit resume file path (ATS)"),
        key_line("b", "Previous step (skill gap)"),
        key_line("r", "Start over"),
        Line::from(""),
        Line::from("Sign-in page:"),
        key_line("↑/↓", "Move between fields"),
        key_line("Ctrl-T", "Switch between sign in and register"),
        key_line("Enter", "Submit"),
    ])
    .wrap(Wrap { trim: false })
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
