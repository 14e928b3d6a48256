//! View rendering for the catalog browser.
//!
//! The list screen is composed top to bottom: collection strip, search
//! line, status line, error alert, rows (or the empty notice), page strip,
//! range label and help footer.
//!
//! The detail screen shows the header (name, genus, badges, types, facts,
//! flavor text), sprites, the tab strip and the active tab.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::style::{self, BAR_EMPTY, BAR_FILL, CURSOR, ELLIPSIS};
use super::{CatalogApp, DetailTab, DetailView, Mode};
use crate::catalog::detail::{
    format_generation, format_sprite_key, format_stat_name, humanize, stat_percentage,
    type_color, MOVES_SHOWN,
};
use crate::catalog::{PokemonDetail, PokemonSpecies, ResourceKind};

const STAT_BAR_WIDTH: usize = 20;
const NUMBER_WIDTH: usize = 4;
const MOVE_NAME_WIDTH: usize = 22;

/// Cuts `text` to at most `width` columns, ending in an ellipsis when cut.
/// Grapheme clusters are never split.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= width {
        return text.to_string();
    }
    let budget = width.saturating_sub(UnicodeWidthStr::width(ELLIPSIS));
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let w = UnicodeWidthStr::width(grapheme);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(grapheme);
    }
    out.push_str(ELLIPSIS);
    out
}

/// Greedy word wrap to `width` columns. Words longer than a line are cut.
pub(crate) fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let needed = UnicodeWidthStr::width(line.as_str())
            + usize::from(!line.is_empty())
            + UnicodeWidthStr::width(word);
        if !line.is_empty() && needed > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&truncate(word, width));
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// `mr-mime` → `Mr-Mime`, `tapu koko` → `Tapu Koko`.
pub(crate) fn display_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-' || c == ' ';
    }
    out
}

impl CatalogApp {
    pub(super) fn view_list(&self) -> String {
        let props = self.state.props();
        let mut sections = vec![self.view_title(), self.view_search(&props.query)];

        sections.push(self.view_status(&props));

        if let Some(error) = &props.error {
            let message = truncate(error, self.width.saturating_sub(4).max(10));
            sections.push(self.styles.error.clone().render(&format!("⚠ {message}")));
            sections.push(self.styles.hint.clone().render("press r to retry"));
        }

        if props.visible_items.is_empty() {
            if !props.loading && props.error.is_none() {
                sections.push(self.view_empty(&props.query));
            }
        } else {
            sections.push(self.view_rows(&props.visible_items, &props.visible_matches));
        }

        if props.total_pages > 1 {
            let summary = self.state.pagination_summary();
            sections.push(self.paginator.view(&summary));
        }
        if props.total_count > 0 {
            sections.push(self.styles.range.clone().render(&props.range_label));
        }

        let help = self.help.view(self);
        if !help.is_empty() {
            sections.push(help);
        }
        sections.join("\n")
    }

    fn view_title(&self) -> String {
        let backend = self
            .sources
            .as_ref()
            .map(|s| s.list.name())
            .unwrap_or("offline");
        let kinds: Vec<String> = ResourceKind::ALL
            .iter()
            .map(|kind| {
                let style = if *kind == self.kind {
                    &self.styles.title
                } else {
                    &self.styles.tab_inactive
                };
                style.clone().render(kind.title())
            })
            .collect();
        format!(
            "{} {}",
            kinds.join(" "),
            self.styles.subtitle.clone().render(&format!("via {backend}"))
        )
    }

    fn view_search(&self, query: &str) -> String {
        let prompt = self.styles.search_prompt.clone().render("Search:");
        match (self.mode, query.is_empty()) {
            (Mode::Search, _) => format!(
                "{} {}█",
                prompt,
                self.styles.search_text.clone().render(query)
            ),
            (_, false) => format!("{} {}", prompt, self.styles.search_text.clone().render(query)),
            (_, true) => self.styles.hint.clone().render("press / to search"),
        }
    }

    fn view_status(&self, props: &crate::viewmodel::Props) -> String {
        let mut status = if props.query.is_empty() {
            if props.total_pages > 0 {
                format!("Page {} of {}", props.current_page, props.total_pages)
            } else {
                String::new()
            }
        } else {
            format!(
                "Found {} {} for \"{}\"",
                props.total_count,
                self.kind.noun(props.total_count),
                props.query
            )
        };
        if props.loading {
            if !status.is_empty() {
                status.push_str(" · ");
            }
            status.push_str("Loading…");
        }
        self.styles.status.clone().render(&status)
    }

    fn view_empty(&self, query: &str) -> String {
        let noun = self.kind.noun(0);
        let text = if query.is_empty() {
            format!("No {noun} found.")
        } else {
            format!("No {noun} found matching \"{query}\".")
        };
        self.styles.empty.clone().render(&text)
    }

    fn view_rows(&self, items: &[crate::catalog::Item], matches: &[Vec<usize>]) -> String {
        // cursor, space, number, space
        let name_width = self.width.saturating_sub(NUMBER_WIDTH + 4).max(8);
        items
            .iter()
            .enumerate()
            .map(|(row, item)| {
                let selected = row == self.selected;
                let marker = if selected { CURSOR } else { " " };
                let number = self
                    .styles
                    .item_number
                    .clone()
                    .render(&item.display_number(NUMBER_WIDTH));
                let highlights = matches.get(row).map(Vec::as_slice).unwrap_or(&[]);
                let name = self.render_name(&item.name, highlights, name_width, selected);
                format!("{marker} {number} {name}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_name(&self, name: &str, highlights: &[usize], width: usize, selected: bool) -> String {
        let base = if selected {
            &self.styles.item_selected
        } else {
            &self.styles.item
        };
        let text = truncate(name, width);
        if highlights.is_empty() {
            return base.clone().render(&text);
        }

        let highlight = &self.styles.match_highlight;
        let mut out = String::new();
        let mut run = String::new();
        let mut run_matched = false;
        for (i, c) in text.chars().enumerate() {
            let matched = highlights.contains(&i);
            if matched != run_matched && !run.is_empty() {
                let style = if run_matched { highlight } else { base };
                out.push_str(&style.clone().render(&run));
                run.clear();
            }
            run_matched = matched;
            run.push(c);
        }
        if !run.is_empty() {
            let style = if run_matched { highlight } else { base };
            out.push_str(&style.clone().render(&run));
        }
        out
    }

    pub(super) fn view_detail(&self) -> String {
        let footer = self.help.short_help_view(vec![
            &self.keys.next_tab,
            &self.keys.prev_tab,
            &self.keys.back,
            &self.keys.quit,
        ]);
        let body = match &self.detail {
            None => String::new(),
            Some(DetailView::Loading(name)) => self
                .styles
                .status
                .clone()
                .render(&format!("Loading {}…", display_name(name))),
            Some(DetailView::Failed(message)) => format!(
                "{}\n{}",
                self.styles.error.clone().render(&format!("⚠ {message}")),
                self.styles.hint.clone().render("press esc to go back")
            ),
            Some(DetailView::Loaded(detail)) => self.view_detail_body(detail),
        };
        format!("{body}\n\n{footer}")
    }

    fn label(&self, text: &str) -> String {
        self.styles.label.clone().render(&format!("{text:<16}"))
    }

    fn view_detail_body(&self, detail: &PokemonDetail) -> String {
        let species = self.species.as_ref();
        let mut lines = Vec::new();

        let mut header = format!(
            "{} {}",
            self.styles
                .title
                .clone()
                .render(&display_name(&detail.name)),
            self.styles
                .subtitle
                .clone()
                .render(&format!("#{:0>width$}", detail.id, width = NUMBER_WIDTH))
        );
        for badge in species.map(PokemonSpecies::badges).unwrap_or_default() {
            header.push(' ');
            header.push_str(&self.styles.badge.clone().render(badge));
        }
        lines.push(header);

        if !detail.types.is_empty() {
            let badges: Vec<String> = detail
                .types
                .iter()
                .map(|t| style::type_badge(type_color(t)).render(&t.to_uppercase()))
                .collect();
            lines.push(badges.join(" "));
        }

        lines.push(String::new());
        let or_unknown = |v: Option<String>| v.unwrap_or_else(|| "unknown".to_string());
        if let Some(genus) = species.and_then(|s| s.genus.as_deref()) {
            lines.push(format!("{}{}", self.label("Category"), genus));
        }
        lines.push(format!(
            "{}{}",
            self.label("Height"),
            or_unknown(detail.height_m().map(|m| format!("{m:.1} m")))
        ));
        lines.push(format!(
            "{}{}",
            self.label("Weight"),
            or_unknown(detail.weight_kg().map(|kg| format!("{kg:.1} kg")))
        ));
        lines.push(format!(
            "{}{}",
            self.label("Base experience"),
            or_unknown(detail.base_experience.map(|xp| xp.to_string()))
        ));
        if let Some(name) = &detail.species {
            lines.push(format!("{}{}", self.label("Species"), display_name(name)));
        }

        if let Some(text) = species.and_then(|s| s.flavor_text.as_deref()) {
            lines.push(String::new());
            for line in wrap(text, self.width.saturating_sub(2).max(20)) {
                lines.push(self.styles.flavor.clone().render(&line));
            }
        }

        if !detail.sprites.is_empty() {
            lines.push(String::new());
            lines.push(self.styles.heading.clone().render("Sprites"));
            for sprite in &detail.sprites {
                lines.push(format!(
                    "  {}{}",
                    self.label(&format_sprite_key(&sprite.key)),
                    truncate(&sprite.url, self.width.saturating_sub(20).max(20))
                ));
            }
        }

        lines.push(String::new());
        lines.push(self.view_tab_strip(detail));
        lines.push(String::new());
        lines.extend(match self.tab {
            DetailTab::Stats => self.view_stats_tab(detail),
            DetailTab::Abilities => self.view_abilities_tab(detail),
            DetailTab::Moves => self.view_moves_tab(detail),
            DetailTab::More => self.view_more_tab(detail, species),
            DetailTab::PastTypes => self.view_past_types_tab(detail),
            DetailTab::PastAbilities => self.view_past_abilities_tab(detail),
        });
        lines.join("\n")
    }

    fn view_tab_strip(&self, detail: &PokemonDetail) -> String {
        DetailTab::available(detail)
            .into_iter()
            .map(|tab| {
                let style = if tab == self.tab {
                    &self.styles.tab_active
                } else {
                    &self.styles.tab_inactive
                };
                style.clone().render(tab.title())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn view_stats_tab(&self, detail: &PokemonDetail) -> Vec<String> {
        if detail.stats.is_empty() {
            return vec![self.styles.empty.clone().render("No stats recorded.")];
        }
        let mut lines: Vec<String> = detail
            .stats
            .iter()
            .map(|stat| {
                format!(
                    "  {}{:>4} {}",
                    self.label(&format_stat_name(&stat.name)),
                    stat.base,
                    self.stat_bar(stat.base)
                )
            })
            .collect();
        lines.push(format!("  {}{:>4}", self.label("Total"), detail.stat_total()));
        lines
    }

    fn view_abilities_tab(&self, detail: &PokemonDetail) -> Vec<String> {
        if detail.abilities.is_empty() {
            return vec![self.styles.empty.clone().render("No abilities recorded.")];
        }
        detail
            .abilities
            .iter()
            .map(|ability| {
                let hidden = if ability.hidden { " (hidden)" } else { "" };
                format!("  {}{}", humanize(&ability.name), hidden)
            })
            .collect()
    }

    fn view_moves_tab(&self, detail: &PokemonDetail) -> Vec<String> {
        if detail.moves.is_empty() {
            return vec![self.styles.empty.clone().render("No moves recorded.")];
        }
        let mut lines = vec![self.styles.label.clone().render(&format!(
            "  {:<MOVE_NAME_WIDTH$}{:>5}  {}",
            "Move", "Level", "Method"
        ))];
        for entry in detail.shown_moves() {
            let level = entry.level.map_or_else(|| "-".to_string(), |l| l.to_string());
            let method = entry.method.as_deref().map_or_else(|| "-".to_string(), humanize);
            lines.push(format!(
                "  {:<MOVE_NAME_WIDTH$}{:>5}  {}",
                truncate(&humanize(&entry.name), MOVE_NAME_WIDTH - 1),
                level,
                method
            ));
        }
        if detail.moves.len() > MOVES_SHOWN {
            lines.push(String::new());
            lines.push(self.styles.hint.clone().render(&format!(
                "Showing {} of {} moves",
                MOVES_SHOWN,
                detail.moves.len()
            )));
        }
        lines
    }

    fn view_more_tab(&self, detail: &PokemonDetail, species: Option<&PokemonSpecies>) -> Vec<String> {
        let mut lines = Vec::new();
        let list = |values: &[String]| {
            values
                .iter()
                .map(|v| humanize(v))
                .collect::<Vec<_>>()
                .join(", ")
        };
        for (title, values) in [
            ("Forms", &detail.forms),
            ("Held items", &detail.held_items),
            ("Games", &detail.games),
        ] {
            if !values.is_empty() {
                lines.push(format!("{}{}", self.label(title), list(values)));
            }
        }
        for (title, url) in [
            ("Cry", &detail.cries.latest),
            ("Legacy cry", &detail.cries.legacy),
        ] {
            if let Some(url) = url {
                lines.push(format!("{}{}", self.label(title), url));
            }
        }

        let Some(species) = species else {
            if lines.is_empty() {
                lines.push(self.styles.empty.clone().render("No additional data."));
            }
            return lines;
        };
        if !lines.is_empty() {
            lines.push(String::new());
        }
        let out_of = |v: Option<u32>| v.map(|v| format!("{v}/255"));
        let facts = [
            ("Capture rate", out_of(species.capture_rate)),
            ("Base happiness", out_of(species.base_happiness)),
            ("Hatch steps", species.hatch_steps().map(|s| s.to_string())),
            ("Growth rate", species.growth_rate.as_deref().map(humanize)),
            (
                "Egg groups",
                (!species.egg_groups.is_empty()).then(|| list(&species.egg_groups)),
            ),
            ("Habitat", species.habitat.as_deref().map(humanize)),
            ("Color", species.color.as_deref().map(humanize)),
            ("Shape", species.shape.as_deref().map(humanize)),
        ];
        for (title, value) in facts {
            if let Some(value) = value {
                lines.push(format!("{}{}", self.label(title), value));
            }
        }
        lines
    }

    fn view_past_types_tab(&self, detail: &PokemonDetail) -> Vec<String> {
        detail
            .past_types
            .iter()
            .map(|past| {
                let badges: Vec<String> = past
                    .types
                    .iter()
                    .map(|t| style::type_badge(type_color(t)).render(&t.to_uppercase()))
                    .collect();
                format!(
                    "{}{}",
                    self.label(&format_generation(&past.generation)),
                    badges.join(" ")
                )
            })
            .collect()
    }

    fn view_past_abilities_tab(&self, detail: &PokemonDetail) -> Vec<String> {
        let mut lines = Vec::new();
        for past in &detail.past_abilities {
            lines.push(
                self.styles
                    .heading
                    .clone()
                    .render(&format_generation(&past.generation)),
            );
            for ability in &past.abilities {
                let hidden = if ability.hidden { " (hidden)" } else { "" };
                lines.push(format!("  {}{}", humanize(&ability.name), hidden));
            }
        }
        lines
    }

    fn stat_bar(&self, base: u32) -> String {
        let filled = ((stat_percentage(base) / 100.0) * STAT_BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(STAT_BAR_WIDTH);
        format!(
            "{}{}",
            self.styles.bar_fill.clone().render(&BAR_FILL.repeat(filled)),
            self.styles
                .bar_empty
                .clone()
                .render(&BAR_EMPTY.repeat(STAT_BAR_WIDTH - filled))
        )
    }
}
