// Order markers drawn on top of the candles
#![allow(non_snake_case)]
use dioxus::prelude::*;
use shared::models::Direction;

use crate::chart::overlay::OrderOverlay;

const BADGE_HEIGHT: f64 = 18.0;
const BADGE_CHAR_WIDTH: f64 = 6.5;

#[component]
pub fn OrderOverlays(overlays: Vec<OrderOverlay>, call_color: String, put_color: String) -> Element {
    let markers = overlays.into_iter().map(|o| {
        let color = match o.direction {
            Direction::Call => call_color.clone(),
            Direction::Put => put_color.clone(),
        };
        let badge_width = o.label.len() as f64 * BADGE_CHAR_WIDTH + 12.0;
        let badge_x = o.badge.x - badge_width - 6.0;
        let badge_y = o.badge.y - BADGE_HEIGHT / 2.0;
        let text_x = badge_x + 6.0;
        rsx! {
            g {
                key: "{o.order_id}",
                line {
                    x1: "{o.start.x}", y1: "{o.start.y}", x2: "{o.end.x}", y2: "{o.end.y}",
                    stroke: "{color}", stroke_width: "1", stroke_dasharray: "4 3",
                }
                if o.fan_level > 0 {
                    line {
                        x1: "{o.badge.x}", y1: "{o.badge.y}", x2: "{o.start.x}", y2: "{o.start.y}",
                        stroke: "{color}", stroke_width: "1",
                    }
                }
                circle { cx: "{o.start.x}", cy: "{o.start.y}", r: "4", fill: "{color}" }
                circle { cx: "{o.end.x}", cy: "{o.end.y}", r: "4", fill: "none", stroke: "{color}", stroke_width: "2" }
                rect {
                    x: "{badge_x}", y: "{badge_y}", width: "{badge_width}", height: "{BADGE_HEIGHT}",
                    rx: "3", fill: "{color}",
                }
                text {
                    x: "{text_x}", y: "{o.badge.y}", fill: "#ffffff", font_size: "11",
                    dominant_baseline: "middle",
                    "{o.label}"
                }
            }
        }
    });

    rsx! {
        g { class: "order-overlays", {markers} }
    }
}
