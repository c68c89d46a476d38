//! Key-driven filter state machine and the matching rules behind it.

use std::cmp::Reverse;

use super::SelectableOption;

/// Rows rendered at once; the highlight never leaves this window.
pub const MAX_VISIBLE: usize = 12;

const EXIT_LABEL: &str = "Exit";
const EXIT_DETAIL: &str = "Cancel";
const NO_MATCHES_DETAIL: &str = "No matches (press Enter to cancel)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Up,
    Down,
    Enter,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// Selection finished; `None` means nothing was chosen.
    Done(Option<String>),
}

/// One rendered row. `id` is `None` for the synthetic exit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a> {
    pub id: Option<&'a str>,
    pub label: &'a str,
    pub detail: &'a str,
}

impl Row<'_> {
    fn matches(&self, needle: &str) -> bool {
        haystack(self.label, self.detail).contains(needle)
    }
}

pub struct FilterState<'a> {
    rows: Vec<Row<'a>>,
    query: String,
    highlighted: usize,
}

impl<'a> FilterState<'a> {
    pub fn new(options: &'a [SelectableOption]) -> Self {
        let exit = Row {
            id: None,
            label: EXIT_LABEL,
            detail: EXIT_DETAIL,
        };
        let rows = std::iter::once(exit)
            .chain(options.iter().map(|o| Row {
                id: Some(o.id.as_str()),
                label: o.label.as_str(),
                detail: o.detail.as_deref().unwrap_or(""),
            }))
            .collect();
        Self {
            rows,
            query: String::new(),
            highlighted: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Rows matching the query, never empty.
    pub fn filtered(&self) -> Vec<Row<'a>> {
        let matched: Vec<Row<'a>> = if self.query.trim().is_empty() {
            self.rows.clone()
        } else {
            let needle = self.query.to_lowercase();
            self.rows.iter().copied().filter(|r| r.matches(&needle)).collect()
        };
        if matched.is_empty() {
            return vec![Row {
                id: None,
                label: EXIT_LABEL,
                detail: NO_MATCHES_DETAIL,
            }];
        }
        matched
    }

    /// Rows to draw, capped at [`MAX_VISIBLE`].
    pub fn visible(&self) -> Vec<Row<'a>> {
        let mut rows = self.filtered();
        rows.truncate(MAX_VISIBLE);
        rows
    }

    pub fn apply(&mut self, key: Key) -> Step {
        match key {
            Key::Char(c) => {
                self.query.push(c);
                self.highlighted = 0;
            }
            Key::Backspace => {
                if self.query.pop().is_some() {
                    self.highlighted = 0;
                }
            }
            Key::Up => self.highlighted = self.highlighted.saturating_sub(1),
            Key::Down => {
                let last = self.visible().len().saturating_sub(1);
                self.highlighted = (self.highlighted + 1).min(last);
            }
            Key::Enter => {
                let rows = self.visible();
                let pick = rows.get(self.highlighted).and_then(|r| r.id);
                return Step::Done(pick.map(str::to_string));
            }
            Key::Cancel => return Step::Done(None),
        }
        Step::Continue
    }
}

fn haystack(label: &str, detail: &str) -> String {
    format!("{label} {detail}").to_lowercase()
}

/// Rank options against `query` for the line prompt.
///
/// Contiguous matches beat subsequence matches; subsequence matches score by
/// how tightly the query characters sit together. Ties go to the label that
/// sorts first. An empty query keeps the input order.
pub fn rank<'a>(options: &'a [SelectableOption], query: &str) -> Vec<&'a SelectableOption> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return options.iter().collect();
    }
    let mut scored: Vec<(u32, &SelectableOption)> = options
        .iter()
        .filter_map(|o| {
            let text = haystack(&o.label, o.detail.as_deref().unwrap_or(""));
            fuzzy_score(&query, &text).map(|score| (score, o))
        })
        .collect();
    scored.sort_by(|(sa, a), (sb, b)| {
        (Reverse(*sa), a.label.as_str()).cmp(&(Reverse(*sb), b.label.as_str()))
    });
    scored.into_iter().map(|(_, o)| o).collect()
}

/// Both arguments are expected lowercase. Contiguous matches score above
/// 1000, earlier ones higher; subsequence matches score `1000 * len / span`.
pub fn fuzzy_score(query: &str, text: &str) -> Option<u32> {
    if let Some(pos) = text.find(query) {
        let pos = text[..pos].chars().count().min(999) as u32;
        return Some(2000 - pos);
    }

    let needle: Vec<char> = query.chars().collect();
    let mut next = 0usize;
    let mut first = None;
    let mut last = 0usize;
    for (i, c) in text.chars().enumerate() {
        if next < needle.len() && c == needle[next] {
            first.get_or_insert(i);
            last = i;
            next += 1;
        }
    }
    if next < needle.len() {
        return None;
    }
    let span = last - first? + 1;
    Some((needle.len() * 1000 / span) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opt(id: &str, detail: Option<&str>) -> SelectableOption {
        SelectableOption {
            id: id.to_string(),
            label: id.to_string(),
            detail: detail.map(str::to_string),
        }
    }

    fn sessions() -> Vec<SelectableOption> {
        vec![
            opt("hive", Some("windows=2 panes=3")),
            opt("ops", None),
            opt("notes", Some("windows=1 panes=1")),
        ]
    }

    fn type_str(state: &mut FilterState<'_>, s: &str) {
        for c in s.chars() {
            assert_eq!(state.apply(Key::Char(c)), Step::Continue);
        }
    }

    #[test]
    fn exit_entry_leads_the_list() {
        let options = sessions();
        let state = FilterState::new(&options);
        let rows = state.filtered();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].id, None);
        assert_eq!(rows[1].id, Some("hive"));
    }

    #[test]
    fn enter_on_exit_entry_selects_nothing() {
        let options = sessions();
        let mut state = FilterState::new(&options);
        assert_eq!(state.apply(Key::Enter), Step::Done(None));
    }

    #[test]
    fn navigate_and_select() {
        let options = sessions();
        let mut state = FilterState::new(&options);
        state.apply(Key::Down);
        state.apply(Key::Down);
        assert_eq!(state.apply(Key::Enter), Step::Done(Some("ops".to_string())));
    }

    #[test]
    fn navigation_is_clamped() {
        let options = sessions();
        let mut state = FilterState::new(&options);
        state.apply(Key::Up);
        assert_eq!(state.highlighted(), 0);
        for _ in 0..10 {
            state.apply(Key::Down);
        }
        assert_eq!(state.highlighted(), 3);
    }

    #[test]
    fn highlight_stays_within_visible_rows() {
        let options: Vec<SelectableOption> =
            (0..30).map(|i| opt(&format!("s{i:02}"), None)).collect();
        let mut state = FilterState::new(&options);
        for _ in 0..40 {
            state.apply(Key::Down);
        }
        assert_eq!(state.visible().len(), MAX_VISIBLE);
        assert_eq!(state.highlighted(), MAX_VISIBLE - 1);
    }

    #[test]
    fn typing_filters_case_insensitively_and_resets_highlight() {
        let options = sessions();
        let mut state = FilterState::new(&options);
        state.apply(Key::Down);
        type_str(&mut state, "HI");
        assert_eq!(state.highlighted(), 0);
        let rows = state.filtered();
        assert_eq!(rows.len(), 1);
        assert_eq!(state.apply(Key::Enter), Step::Done(Some("hive".to_string())));
    }

    #[test]
    fn detail_participates_in_match() {
        let options = sessions();
        let mut state = FilterState::new(&options);
        type_str(&mut state, "panes=1");
        let ids: Vec<_> = state.filtered().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![Some("notes")]);
    }

    #[test]
    fn no_matches_shows_exit_row() {
        let options = sessions();
        let mut state = FilterState::new(&options);
        type_str(&mut state, "zzz");
        let rows = state.filtered();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, None);
        assert_eq!(rows[0].detail, NO_MATCHES_DETAIL);
        assert_eq!(state.apply(Key::Enter), Step::Done(None));
    }

    #[test]
    fn backspace_widens_and_is_noop_when_empty() {
        let options = sessions();
        let mut state = FilterState::new(&options);
        assert_eq!(state.apply(Key::Backspace), Step::Continue);
        assert_eq!(state.query(), "");
        type_str(&mut state, "opz");
        assert_eq!(state.filtered()[0].id, None);
        state.apply(Key::Backspace);
        assert_eq!(state.query(), "op");
        assert_eq!(state.filtered()[0].id, Some("ops"));
    }

    #[test]
    fn cancel_returns_nothing() {
        let options = sessions();
        let mut state = FilterState::new(&options);
        state.apply(Key::Down);
        assert_eq!(state.apply(Key::Cancel), Step::Done(None));
    }

    #[test]
    fn narrowing_never_grows_matches() {
        let options = sessions();
        let mut state = FilterState::new(&options);
        let real = |s: &FilterState<'_>| s.filtered().iter().filter(|r| r.id.is_some()).count();
        let mut previous = real(&state);
        for c in "windows=2".chars() {
            state.apply(Key::Char(c));
            let now = real(&state);
            assert!(now <= previous, "query {:?} grew matches", state.query());
            previous = now;
        }
    }

    #[test]
    fn rank_prefers_contiguous_then_density_then_label() {
        let options = vec![
            opt("b-spread", Some("h x x x i x x x v x x x e")),
            opt("a-dense", Some("h-i-v-e")),
            opt("hive", None),
            opt("archive", None),
        ];
        let ranked: Vec<&str> = rank(&options, "hive").iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ranked, vec!["hive", "archive", "a-dense", "b-spread"]);
    }

    #[test]
    fn rank_ties_break_on_label() {
        let options = vec![opt("b", Some("x")), opt("a", Some("x")), opt("c", Some("yx"))];
        let ranked: Vec<&str> = rank(&options, "x").iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ranked, vec!["a", "b", "c"]);
    }

    #[test]
    fn empty_query_keeps_order() {
        let options = vec![opt("b", None), opt("a", None)];
        let ranked: Vec<&str> = rank(&options, "  ").iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ranked, vec!["b", "a"]);
    }

    #[test]
    fn fuzzy_score_rejects_missing_chars() {
        assert_eq!(fuzzy_score("xyz", "hive"), None);
        assert_eq!(fuzzy_score("hv", "hive"), Some(666));
        assert!(fuzzy_score("hi", "hive").expect("substring") > 1000);
    }
}
