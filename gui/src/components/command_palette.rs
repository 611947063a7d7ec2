// Asset palette (VSCode style): fuzzy search over the asset catalog
#![allow(non_snake_case)]
use dioxus::prelude::*;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use shared::models::AssetConfig;

use crate::state::AppState;

/// Assets matching `query` on id or name, best match first. An empty query keeps catalog order.
pub fn filter_assets(query: &str, assets: &[AssetConfig]) -> Vec<AssetConfig> {
    let query = query.trim();
    if query.is_empty() {
        return assets.to_vec();
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, &AssetConfig)> = assets
        .iter()
        .filter_map(|asset| {
            let haystack = format!("{} {}", asset.id, asset.name);
            matcher.fuzzy_match(&haystack, query).map(|score| (score, asset))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, asset)| asset.clone()).collect()
}

#[component]
pub fn AssetPalette() -> Element {
    let mut app_state = use_context::<Signal<AppState>>();
    let mut filter_text = use_signal(String::new);
    let mut selected_index = use_signal(|| 0usize);

    let (visible, catalog) = {
        let state = app_state.read();
        (state.command_palette_visible, state.config.assets.clone())
    };
    if !visible {
        return None;
    }

    let matches = filter_assets(&filter_text.read(), &catalog);
    let selected = (*selected_index.read()).min(matches.len().saturating_sub(1));

    let mut choose = move |symbol: String| {
        app_state.write().select_asset(&symbol);
        filter_text.set(String::new());
        selected_index.set(0);
    };

    let keyboard_matches = matches.clone();
    let handle_keydown = move |evt: KeyboardEvent| {
        let len = keyboard_matches.len();
        match evt.key() {
            Key::ArrowDown if len > 0 => selected_index.set((selected + 1) % len),
            Key::ArrowUp if len > 0 => selected_index.set((selected + len - 1) % len),
            Key::Enter => {
                if let Some(asset) = keyboard_matches.get(selected) {
                    choose(asset.id.clone());
                }
            }
            Key::Escape => {
                app_state.write().command_palette_visible = false;
                filter_text.set(String::new());
            }
            _ => {}
        }
    };

    let no_matches = matches.is_empty();
    let rows = matches.into_iter().enumerate().map(|(idx, asset)| {
        let bg_color = if idx == selected { "#555" } else { "transparent" };
        let id = asset.id.clone();
        rsx! {
            li {
                key: "{asset.id}",
                style: "padding: 10px 12px; border-bottom: 1px solid #444; cursor: pointer; background-color: {bg_color}; border-radius: 3px;",
                onclick: move |_| choose(id.clone()),
                onmouseenter: move |_| selected_index.set(idx),
                div { style: "font-weight: bold;", "{asset.id}" }
                div { style: "font-size: 0.9em; color: #aaa;", "{asset.name} - payout {asset.payout:.0}%" }
            }
        }
    });

    rsx! {
        div {
            class: "command-palette",
            style: "position: fixed; top: 10%; left: 50%; transform: translateX(-50%); background-color: #333; color: #eee; border: 1px solid #555; padding: 15px; z-index: 1000; width: 480px; border-radius: 8px; box-shadow: 0 5px 15px rgba(0,0,0,0.5);",
            onkeydown: handle_keydown,
            input {
                id: "command-palette-input",
                r#type: "text",
                value: "{filter_text}",
                placeholder: "Search assets...",
                autofocus: true,
                style: "width: calc(100% - 20px); padding: 10px; margin-bottom: 10px; background-color: #444; color: #eee; border: 1px solid #666; border-radius: 4px;",
                oninput: move |evt| {
                    filter_text.set(evt.value());
                    selected_index.set(0);
                },
            }
            ul {
                style: "list-style: none; padding: 0; margin: 0; max-height: 300px; overflow-y: auto;",
                if no_matches {
                    li { style: "padding: 8px; color: #888;", "No assets match your search." }
                }
                {rows}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<AssetConfig> {
        ["EURUSD-OTC:EUR/USD (OTC)", "BTCUSD-OTC:Bitcoin (OTC)", "XAUUSD-OTC:Gold (OTC)"]
            .iter()
            .map(|entry| {
                let (id, name) = entry.split_once(':').unwrap();
                AssetConfig {
                    id: id.to_string(),
                    name: name.to_string(),
                    initial_price: 1.0,
                    volatility: 0.0,
                    payout: 80.0,
                    seed: None,
                }
            })
            .collect()
    }

    #[test]
    fn empty_query_keeps_catalog_order() {
        let ids: Vec<String> = filter_assets("  ", &catalog()).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["EURUSD-OTC", "BTCUSD-OTC", "XAUUSD-OTC"]);
    }

    #[test]
    fn query_matches_name_and_id() {
        let by_name = filter_assets("gold", &catalog());
        assert_eq!(by_name[0].id, "XAUUSD-OTC");
        let by_id = filter_assets("btc", &catalog());
        assert_eq!(by_id[0].id, "BTCUSD-OTC");
        assert!(filter_assets("zzzz", &catalog()).is_empty());
    }
}
