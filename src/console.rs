use crate::{
    map::{InfoPanel, MarkerId},
    state::AppState,
};

pub const HELP: &str = "\
commands:
  keyword <text>     search for <text>
  preset <name>      search a preset keyword (golf, ramen)
  locate             re-acquire the current location
  list               show or hide the place list
  select <n>         open the n-th listed place (1-based)
  click <marker>     click a marker by id
  show               print the map
  wait               wait for the running search to finish
  help               print this help
  quit               exit";

#[derive(Debug, PartialEq)]
pub enum Command {
    Keyword(String),
    Preset(String),
    Locate,
    ToggleList,
    Select(usize),
    Click(MarkerId),
    Show,
    Wait,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map(|(head, rest)| (head, rest.trim()))
            .unwrap_or((line, ""));

        match (head, rest) {
            ("keyword" | "k", text) if !text.is_empty() => Ok(Command::Keyword(text.to_owned())),
            ("preset" | "p", name) if !name.is_empty() => Ok(Command::Preset(name.to_owned())),
            ("locate", "") => Ok(Command::Locate),
            ("list", "") => Ok(Command::ToggleList),
            ("select" | "s", n) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Ok(Command::Select(n - 1)),
                _ => Err(format!("expected a list position, got {n:?}")),
            },
            ("click" | "c", id) => id
                .parse::<MarkerId>()
                .map(Command::Click)
                .map_err(|_| format!("expected a marker id, got {id:?}")),
            ("show", "") => Ok(Command::Show),
            ("wait", "") => Ok(Command::Wait),
            ("help" | "?", "") => Ok(Command::Help),
            ("quit" | "exit" | "q", "") => Ok(Command::Quit),
            _ => Err(format!("unknown command {line:?}, try help")),
        }
    }
}

/// Plain-text rendering of the map, the open info panel and the list.
pub fn render(state: &AppState) -> String {
    let mut out = String::new();
    let Some(view) = &state.map else {
        out.push_str("no map yet (use `locate` to retry)\n");
        return out;
    };

    out.push_str(&format!(
        "map centered at {} (zoom {}), keyword {:?}\n",
        view.center(),
        view.zoom(),
        state.keyword
    ));
    for marker in view.markers() {
        out.push_str(&format!(
            "  [#{}] {} at {} ({})\n",
            marker.id,
            marker.title,
            marker.position,
            marker.icon.url().unwrap_or("default pin")
        ));
    }
    let panel_open = state.info_panel.as_ref().is_some_and(InfoPanel::is_open);
    if let Some(window) = view.info_window().filter(|_| panel_open) {
        out.push_str(&format!("info panel at #{}:\n", window.anchor));
        for line in window.content.lines() {
            out.push_str(&format!("  | {line}\n"));
        }
    }
    if state.list_visible {
        out.push_str("places:\n");
        for (i, place) in state.places.iter().enumerate() {
            let rating = place
                .rating
                .map(|r| r.to_string())
                .unwrap_or_else(|| "unknown".to_owned());
            out.push_str(&format!(
                "  {}. {} ★ {} {}\n",
                i + 1,
                place.name,
                rating,
                place.vicinity.as_deref().unwrap_or("")
            ));
        }
    }
    out
}
