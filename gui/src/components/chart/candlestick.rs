// Candlestick chart: draws the latest Scene as SVG and feeds pointer input to the renderer
#![allow(non_snake_case)]
use dioxus::prelude::*;

use super::order_overlay::OrderOverlays;
use crate::config::theme::ThemePalette;
use crate::state::AppState;

#[component]
pub fn ChartView() -> Element {
    let mut app_state = use_context::<Signal<AppState>>();
    let mut cursor_x = use_signal(|| 0.0f64);

    let (scene, palette, wick_width) = {
        let state = app_state.read();
        let palette = ThemePalette::for_theme(&state.current_theme).with_candle_style(&state.config.chart.candle);
        (state.scene.clone(), palette, state.config.chart.candle.wick_width)
    };
    let Some(scene) = scene else {
        return rsx! {
            div { class: "chart-loading", style: "padding: 24px; color: #787b86;", "Loading market..." }
        };
    };

    let grid = scene.grid.iter().map(|g| {
        let label_x = scene.plot_width + 6.0;
        rsx! {
            line { x1: "0", y1: "{g.y}", x2: "{scene.plot_width}", y2: "{g.y}", stroke: "{palette.grid}", stroke_width: "1" }
            text { x: "{label_x}", y: "{g.y}", fill: "{palette.axis_text}", font_size: "11", dominant_baseline: "middle", "{g.label}" }
        }
    });

    let time_y = scene.plot_height + 16.0;
    let time_labels = scene.time_labels.iter().map(|t| {
        rsx! {
            text { x: "{t.x}", y: "{time_y}", fill: "{palette.axis_text}", font_size: "11", text_anchor: "middle", "{t.label}" }
        }
    });

    let candles = scene.candles.iter().map(|c| {
        let color = if c.bullish { palette.chart_bullish.clone() } else { palette.chart_bearish.clone() };
        let body_x = c.x - c.body_width / 2.0;
        rsx! {
            g {
                key: "{c.index}",
                line { x1: "{c.x}", y1: "{c.wick_top}", x2: "{c.x}", y2: "{c.wick_bottom}", stroke: "{color}", stroke_width: "{wick_width}" }
                rect { x: "{body_x}", y: "{c.body_top}", width: "{c.body_width}", height: "{c.body_height}", fill: "{color}" }
            }
        }
    });

    let live = scene.live_line.clone().map(|live| {
        let label_x = scene.plot_width + 2.0;
        let label_y = live.y - 9.0;
        let text_x = label_x + 4.0;
        rsx! {
            line { x1: "0", y1: "{live.y}", x2: "{scene.plot_width}", y2: "{live.y}", stroke: "{palette.live_line}", stroke_width: "1", stroke_dasharray: "2 2" }
            rect { x: "{label_x}", y: "{label_y}", width: "68", height: "18", fill: "{palette.live_line}" }
            text { x: "{text_x}", y: "{live.y}", fill: "#000000", font_size: "11", dominant_baseline: "middle", "{live.label}" }
        }
    });

    let countdown = scene.countdown.clone().map(|cd| {
        let box_x = cd.x + 8.0;
        let box_y = cd.y - 28.0;
        let text_x = box_x + 24.0;
        let text_y = box_y + 9.0;
        rsx! {
            rect { x: "{box_x}", y: "{box_y}", width: "48", height: "18", rx: "3", fill: "{palette.countdown_bg}" }
            text { x: "{text_x}", y: "{text_y}", fill: "{palette.foreground}", font_size: "11", text_anchor: "middle", dominant_baseline: "middle", "{cd.label}" }
        }
    });

    let show_return = scene.show_return_to_follow;
    let return_left = scene.plot_width - 150.0;

    rsx! {
        div {
            class: "chart-view",
            style: "position: relative; user-select: none;",
            svg {
                width: "{scene.width}",
                height: "{scene.height}",
                style: "background-color: {palette.background}; cursor: crosshair; display: block;",
                onmousedown: move |evt: MouseEvent| {
                    let x = evt.element_coordinates().x;
                    app_state.write().renderer_mut().begin_drag(x);
                },
                onmousemove: move |evt: MouseEvent| {
                    let x = evt.element_coordinates().x;
                    cursor_x.set(x);
                    let dragging = app_state.read().renderer().viewport().is_dragging();
                    if dragging {
                        app_state.write().renderer_mut().drag_to(x);
                    }
                },
                onmouseup: move |_| app_state.write().renderer_mut().end_drag(),
                onmouseleave: move |_| app_state.write().renderer_mut().end_drag(),
                onwheel: move |evt: WheelEvent| {
                    let delta_y = evt.delta().strip_units().y;
                    let x = *cursor_x.read();
                    app_state.write().renderer_mut().on_wheel(x, delta_y);
                },
                g {
                    style: "pointer-events: none;",
                    {grid}
                    {time_labels}
                    {candles}
                    {live}
                    OrderOverlays {
                        overlays: scene.overlays.clone(),
                        call_color: palette.call.clone(),
                        put_color: palette.put.clone(),
                    }
                    {countdown}
                }
            }
            if show_return {
                button {
                    class: "return-to-follow",
                    style: "position: absolute; top: 12px; left: {return_left}px; padding: 4px 10px; background: {palette.countdown_bg}; color: {palette.foreground}; border: none; border-radius: 4px; cursor: pointer;",
                    onclick: move |_| app_state.write().renderer_mut().return_to_follow(),
                    "Back to live"
                }
            }
        }
    }
}
