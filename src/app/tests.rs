//! Tests for the catalog browser model.

use std::sync::Arc;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyModifiers};

use super::*;
use crate::catalog::{Ability, Move, Stat};
use crate::error::AdapterError;
use crate::source::{DataSource, DetailSource, MemorySource, Paging};

const STARTERS: [&str; 9] = [
    "bulbasaur",
    "ivysaur",
    "venusaur",
    "charmander",
    "charmeleon",
    "charizard",
    "squirtle",
    "wartortle",
    "blastoise",
];

const BERRIES: [&str; 3] = ["cheri", "chesto", "pecha"];

const LOCATIONS: [&str; 1] = ["canalave-city"];

struct StubDetail;

#[async_trait]
impl DetailSource for StubDetail {
    async fn fetch_detail(&self, id_or_name: &str) -> Result<PokemonDetail, AdapterError> {
        if id_or_name != "4" {
            return Err(AdapterError::NotFound {
                kind: "pokemon".into(),
                id: id_or_name.into(),
            });
        }
        Ok(PokemonDetail {
            id: 4,
            name: "charmander".into(),
            height: Some(6),
            weight: Some(85),
            base_experience: Some(62),
            types: vec!["fire".into()],
            abilities: vec![Ability {
                name: "solar-power".into(),
                hidden: true,
            }],
            stats: vec![Stat {
                name: "special-attack".into(),
                base: 60,
            }],
            species: Some("charmander".into()),
            species_id: Some(4),
            moves: (1..=60)
                .map(|i| Move {
                    name: format!("move-{i}"),
                    level: (i % 2 == 0).then_some(i),
                    method: Some("level-up".into()),
                })
                .collect(),
            forms: vec!["charmander".into()],
            ..PokemonDetail::default()
        })
    }

    async fn fetch_species(&self, id_or_name: &str) -> Result<PokemonSpecies, AdapterError> {
        if id_or_name != "4" {
            return Err(AdapterError::NotFound {
                kind: "pokemon-species".into(),
                id: id_or_name.into(),
            });
        }
        Ok(PokemonSpecies {
            id: 4,
            name: "charmander".into(),
            genus: Some("Lizard Pokémon".into()),
            flavor_text: Some(crate::catalog::species::clean_flavor_text(
                "Obviously prefers\nhot places.\u{c}When it rains,",
            )),
            capture_rate: Some(45),
            egg_groups: vec!["monster".into(), "dragon".into()],
            ..PokemonSpecies::default()
        })
    }
}

struct FailingSource;

#[async_trait]
impl DataSource for FailingSource {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn preferred_paging(&self) -> Paging {
        Paging::ServerPaged
    }

    async fn fetch_page(
        &self,
        _offset: usize,
        _limit: usize,
        _query: Option<&str>,
    ) -> Result<Page, AdapterError> {
        Err(AdapterError::status("memory://catalog/", 500, ""))
    }
}

fn config(page_size: usize, paging: Paging) -> Config {
    Config {
        page_size: Some(page_size),
        paging: Some(paging),
        ..Config::default()
    }
}

fn memory_sources(kind: ResourceKind) -> Result<Sources, AdapterError> {
    let names: &[&str] = match kind {
        ResourceKind::Pokemon => &STARTERS,
        ResourceKind::Berry => &BERRIES,
        ResourceKind::Location => &LOCATIONS,
    };
    Ok(Sources {
        list: Arc::new(MemorySource::from_names(names).with_paging(Paging::ClientHeld)),
        detail: Arc::new(StubDetail),
    })
}

fn app_with(config: &Config) -> CatalogApp {
    CatalogApp::new(config, Arc::new(memory_sources))
}

fn app(page_size: usize, paging: Paging) -> CatalogApp {
    app_with(&config(page_size, paging))
}

fn key(code: KeyCode) -> Msg {
    Box::new(KeyMsg {
        key: code,
        modifiers: KeyModifiers::NONE,
    })
}

// Runs commands until none is left, feeding every message back.
async fn drain(app: &mut CatalogApp, cmd: Option<Cmd>) {
    let mut next = cmd;
    while let Some(cmd) = next.take() {
        if let Some(msg) = cmd.await {
            next = app.update(msg);
        }
    }
}

async fn press(app: &mut CatalogApp, code: KeyCode) {
    let cmd = app.update(key(code));
    drain(app, cmd).await;
}

async fn started(page_size: usize, paging: Paging) -> CatalogApp {
    started_with(app(page_size, paging)).await
}

async fn started_with(mut app: CatalogApp) -> CatalogApp {
    let cmd = app.start();
    drain(&mut app, cmd).await;
    app
}

fn plain(app: &CatalogApp) -> String {
    strip_ansi_escapes::strip_str(app.view())
}

#[tokio::test]
async fn test_first_page_renders_after_start() {
    let app = started(4, Paging::ClientHeld).await;
    let view = plain(&app);
    assert!(view.contains("Pokemon"), "{view}");
    assert!(view.contains("Page 1 of 3"), "{view}");
    assert!(view.contains("#0001 bulbasaur"), "{view}");
    assert!(!view.contains("charmeleon"), "{view}");
    assert!(view.contains("Showing 1 - 4 of 9"), "{view}");
}

#[tokio::test]
async fn test_arrow_keys_page_in_both_modes() {
    for paging in [Paging::ClientHeld, Paging::ServerPaged] {
        let mut app = started(4, paging).await;
        press(&mut app, KeyCode::Right).await;
        let view = plain(&app);
        assert!(view.contains("Page 2 of 3"), "{paging:?}: {view}");
        assert!(view.contains("charmeleon"), "{paging:?}: {view}");

        press(&mut app, KeyCode::End).await;
        assert!(plain(&app).contains("Showing 9 - 9 of 9"));

        press(&mut app, KeyCode::Right).await;
        assert_eq!(app.state().pagination_summary().current_page, 3);

        press(&mut app, KeyCode::Home).await;
        assert_eq!(app.state().pagination_summary().current_page, 1);
    }
}

#[tokio::test]
async fn test_digit_selects_page_button() {
    let mut app = started(2, Paging::ClientHeld).await;
    press(&mut app, KeyCode::Char('3')).await;
    assert_eq!(app.state().pagination_summary().current_page, 3);

    press(&mut app, KeyCode::Char('9')).await;
    assert_eq!(app.state().pagination_summary().current_page, 3, "no ninth button");
}

#[tokio::test]
async fn test_search_mode_edits_query() {
    let mut app = started(4, Paging::ClientHeld).await;
    press(&mut app, KeyCode::Right).await;
    press(&mut app, KeyCode::Char('/')).await;
    assert_eq!(app.mode(), Mode::Search);

    for c in "char".chars() {
        press(&mut app, KeyCode::Char(c)).await;
    }
    let view = plain(&app);
    assert!(view.contains("Search: char"), "{view}");
    assert!(view.contains("Found 3 pokemon for \"char\""), "{view}");
    assert_eq!(app.state().pagination_summary().current_page, 1);

    press(&mut app, KeyCode::Backspace).await;
    assert_eq!(app.state().search().query(), "cha");

    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.mode(), Mode::Browse);
    assert_eq!(app.state().search().query(), "cha");

    press(&mut app, KeyCode::Esc).await;
    assert_eq!(app.state().search().query(), "");
}

#[tokio::test]
async fn test_search_typing_q_does_not_quit() {
    let mut app = started(4, Paging::ClientHeld).await;
    press(&mut app, KeyCode::Char('/')).await;
    let cmd = app.update(key(KeyCode::Char('q')));
    assert!(cmd.is_none());
    assert_eq!(app.state().search().query(), "q");
}

#[tokio::test]
async fn test_empty_search_shows_notice() {
    let mut app = started(4, Paging::ServerPaged).await;
    press(&mut app, KeyCode::Char('/')).await;
    for c in "zzz".chars() {
        press(&mut app, KeyCode::Char(c)).await;
    }
    let view = plain(&app);
    assert!(view.contains("No pokemon found matching \"zzz\"."), "{view}");
    assert!(!view.contains("Showing"), "{view}");
}

#[tokio::test]
async fn test_selection_moves_and_resets_on_page_change() {
    let mut app = started(4, Paging::ClientHeld).await;
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Char('j')).await;
    assert_eq!(app.selected(), 2);

    for _ in 0..10 {
        press(&mut app, KeyCode::Down).await;
    }
    assert_eq!(app.selected(), 3);

    press(&mut app, KeyCode::Right).await;
    assert_eq!(app.selected(), 0);

    press(&mut app, KeyCode::Up).await;
    assert_eq!(app.selected(), 0);
}

#[tokio::test]
async fn test_enter_opens_detail_and_esc_returns() {
    let mut app = started(4, Paging::ClientHeld).await;
    for _ in 0..3 {
        press(&mut app, KeyCode::Down).await;
    }
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.mode(), Mode::Detail);
    match app.detail() {
        Some(DetailView::Loaded(detail)) => assert_eq!(detail.name, "charmander"),
        other => panic!("unexpected detail state {other:?}"),
    }
    assert_eq!(app.tab(), DetailTab::Stats);

    let view = plain(&app);
    assert!(view.contains("Charmander"), "{view}");
    assert!(view.contains("FIRE"), "{view}");
    assert!(view.contains("0.6 m"), "{view}");
    assert!(view.contains("Special Attack"), "{view}");
    assert!(!view.contains("solar power"), "{view}");

    press(&mut app, KeyCode::Esc).await;
    assert_eq!(app.mode(), Mode::Browse);
    assert!(app.detail().is_none());
    assert!(app.species().is_none());
}

async fn charmander_detail() -> CatalogApp {
    let mut app = started(4, Paging::ClientHeld).await;
    for _ in 0..3 {
        press(&mut app, KeyCode::Down).await;
    }
    press(&mut app, KeyCode::Enter).await;
    app
}

#[tokio::test]
async fn test_detail_loads_species_header() {
    let app = charmander_detail().await;
    let species = app.species().expect("species loaded after detail");
    assert_eq!(species.genus.as_deref(), Some("Lizard Pokémon"));

    let view = plain(&app);
    assert!(view.contains("Category"), "{view}");
    assert!(view.contains("Lizard Pokémon"), "{view}");
    assert!(view.contains("Obviously prefers hot places. When it rains,"), "{view}");
    assert!(!view.contains('\u{c}'), "{view}");
}

#[tokio::test]
async fn test_detail_tabs_cycle_through_sections() {
    let mut app = charmander_detail().await;
    let view = plain(&app);
    assert!(view.contains("Stats"), "{view}");
    assert!(!view.contains("Type history"), "no history tabs without history: {view}");

    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.tab(), DetailTab::Abilities);
    assert!(plain(&app).contains("solar power (hidden)"));

    press(&mut app, KeyCode::Right).await;
    assert_eq!(app.tab(), DetailTab::Moves);
    let view = plain(&app);
    assert!(view.contains("move 1"), "{view}");
    assert!(view.contains("move 50"), "{view}");
    assert!(!view.contains("move 51"), "{view}");
    assert!(view.contains("Showing 50 of 60 moves"), "{view}");

    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.tab(), DetailTab::More);
    let view = plain(&app);
    assert!(view.contains("45/255"), "{view}");
    assert!(view.contains("monster, dragon"), "{view}");

    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.tab(), DetailTab::Stats, "wraps around");

    press(&mut app, KeyCode::Left).await;
    assert_eq!(app.tab(), DetailTab::More);
}

#[tokio::test]
async fn test_history_tabs_follow_detail() {
    let detail = PokemonDetail {
        past_types: vec![crate::catalog::PastTypes {
            generation: "generation-v".into(),
            types: vec!["normal".into()],
        }],
        ..PokemonDetail::default()
    };
    assert_eq!(
        DetailTab::available(&detail),
        vec![
            DetailTab::Stats,
            DetailTab::Abilities,
            DetailTab::Moves,
            DetailTab::More,
            DetailTab::PastTypes
        ]
    );

    let mut app = started(4, Paging::ClientHeld).await;
    app.mode = Mode::Detail;
    app.detail = Some(DetailView::Loaded(Box::new(detail)));
    press(&mut app, KeyCode::BackTab).await;
    assert_eq!(app.tab(), DetailTab::PastTypes);
    let view = plain(&app);
    assert!(view.contains("GENERATION V"), "{view}");
    assert!(view.contains("NORMAL"), "{view}");
}

#[tokio::test]
async fn test_species_failure_keeps_detail() {
    let mut app = charmander_detail().await;
    let cmd = app.update(Box::new(SpeciesLoadedMsg {
        seq: app.detail_seq,
        result: Err(AdapterFailure::new("species offline")),
    }));
    assert!(cmd.is_none());
    assert!(matches!(app.detail(), Some(DetailView::Loaded(_))));
}

#[tokio::test]
async fn test_detail_failure_is_shown() {
    let mut app = started(4, Paging::ClientHeld).await;
    press(&mut app, KeyCode::Enter).await;
    let view = plain(&app);
    assert!(view.contains("pokemon '1' not found"), "{view}");
}

#[tokio::test]
async fn test_stale_detail_is_ignored() {
    let mut app = started(4, Paging::ClientHeld).await;
    let pending = app.update(key(KeyCode::Enter)).expect("detail fetch");
    let cmd = app.update(key(KeyCode::Esc));
    assert!(cmd.is_none());

    if let Some(msg) = pending.await {
        app.update(msg);
    }
    assert_eq!(app.mode(), Mode::Browse);
    assert!(app.detail().is_none());
}

#[tokio::test]
async fn test_berries_have_no_detail() {
    let config = Config {
        resource: ResourceKind::Berry,
        ..config(20, Paging::ClientHeld)
    };
    let mut app = started_with(app_with(&config)).await;

    assert!(app.update(key(KeyCode::Enter)).is_none());
    assert_eq!(app.mode(), Mode::Browse);
    assert!(plain(&app).contains("Berries"));
    assert!(plain(&app).contains("cheri"));
}

#[tokio::test]
async fn test_failure_shows_alert_and_retries() {
    let factory = |_: ResourceKind| -> Result<Sources, AdapterError> {
        Ok(Sources {
            list: Arc::new(FailingSource),
            detail: Arc::new(StubDetail),
        })
    };
    let mut app = CatalogApp::new(&config(20, Paging::ServerPaged), Arc::new(factory));
    let cmd = app.start();
    drain(&mut app, cmd).await;

    let view = plain(&app);
    assert!(view.contains("HTTP error! status: 500"), "{view}");
    assert!(view.contains("press r to retry"), "{view}");
    assert!(app.update(key(KeyCode::Right)).is_none());

    let retry = app.update(key(KeyCode::Char('r')));
    assert!(retry.is_some(), "retry issues a new fetch");
    assert!(app.state().is_loading());
    drain(&mut app, retry).await;
    assert!(app.state().error().is_some());
}

#[tokio::test]
async fn test_unavailable_source_reports_reason() {
    let factory = |_: ResourceKind| -> Result<Sources, AdapterError> {
        Err(AdapterError::InvalidUrl("http://".into()))
    };
    let mut app = CatalogApp::new(&Config::default(), Arc::new(factory));
    assert!(app.start().is_none());
    let view = plain(&app);
    assert!(view.contains("invalid url 'http://'"), "{view}");
    assert!(view.contains("via offline"), "{view}");
}

#[tokio::test]
async fn test_tab_switches_collection_and_resets_view() {
    let mut app = started(2, Paging::ClientHeld).await;
    press(&mut app, KeyCode::Right).await;
    press(&mut app, KeyCode::Char('/')).await;
    press(&mut app, KeyCode::Char('a')).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.state().search().query(), "a");

    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.kind(), ResourceKind::Berry);
    assert_eq!(app.state().search().query(), "");
    assert_eq!(app.state().pagination_summary().current_page, 1);
    assert_eq!(app.selected(), 0);
    let view = plain(&app);
    assert!(view.contains("cheri"), "{view}");
    assert!(!view.contains("bulbasaur"), "{view}");
    assert!(view.contains("Showing 1 - 2 of 3"), "{view}");

    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.kind(), ResourceKind::Location);
    assert!(plain(&app).contains("canalave-city"));

    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.kind(), ResourceKind::Pokemon);
}

#[tokio::test]
async fn test_shift_tab_goes_to_previous_collection() {
    let mut app = started(4, Paging::ClientHeld).await;
    let back_tab: Msg = Box::new(KeyMsg {
        key: KeyCode::BackTab,
        modifiers: KeyModifiers::SHIFT,
    });
    let cmd = app.update(back_tab);
    drain(&mut app, cmd).await;
    assert_eq!(app.kind(), ResourceKind::Location);
    assert!(plain(&app).contains("canalave-city"));
}

#[tokio::test]
async fn test_page_from_previous_collection_is_ignored() {
    let mut app = app(4, Paging::ClientHeld);
    let pending = app.start().expect("first fetch");
    let switched = app.update(key(KeyCode::Tab));
    assert!(switched.is_some());

    if let Some(msg) = pending.await {
        assert!(app.update(msg).is_none());
    }
    assert!(app.state().is_loading(), "berries still pending");
    assert!(app.state().visible_items().is_empty());

    drain(&mut app, switched).await;
    let names: Vec<_> = app
        .state()
        .visible_items()
        .iter()
        .map(|i| i.name.clone())
        .collect();
    assert_eq!(names, vec!["cheri", "chesto", "pecha"]);
}

#[tokio::test]
async fn test_sources_are_built_once_per_collection() {
    let builds = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = builds.clone();
    let factory = move |kind: ResourceKind| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        memory_sources(kind)
    };
    let mut app = started_with(CatalogApp::new(&config(4, Paging::ClientHeld), Arc::new(factory))).await;
    press(&mut app, KeyCode::Tab).await;
    press(&mut app, KeyCode::BackTab).await;
    assert_eq!(app.kind(), ResourceKind::Pokemon);
    assert_eq!(builds.load(std::sync::atomic::Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_arabic_page_strip_from_config() {
    let config = Config {
        page_strip: paginator::Type::Arabic,
        ..config(4, Paging::ClientHeld)
    };
    let mut app = started_with(app_with(&config)).await;
    assert!(plain(&app).contains("1/3"), "{}", plain(&app));
    press(&mut app, KeyCode::Right).await;
    assert!(plain(&app).contains("2/3"));
}

#[tokio::test]
async fn test_quit_keys() {
    let mut app = started(4, Paging::ClientHeld).await;
    assert!(app.update(key(KeyCode::Char('q'))).is_some());
    let ctrl_c: Msg = Box::new(KeyMsg {
        key: KeyCode::Char('c'),
        modifiers: KeyModifiers::CONTROL,
    });
    assert!(app.update(ctrl_c).is_some());
}

#[tokio::test]
async fn test_window_size_limits_help_width() {
    let mut app = started(4, Paging::ClientHeld).await;
    let cmd = app.update(Box::new(WindowSizeMsg {
        width: 40,
        height: 20,
    }));
    assert!(cmd.is_none());
    assert_eq!(app.help.width, 40);

    press(&mut app, KeyCode::Char('?')).await;
    assert!(app.help.show_all);
    assert!(plain(&app).contains("first page"));
}
