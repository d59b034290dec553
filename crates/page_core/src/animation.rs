//! Counters, scroll-reveal and lazy images, all driven by intersection observers.

use shared::{
    domain::ElementId,
    protocol::{Effect, IntersectionEntry, ObserverKind, ObserverOptions, Target, UiCommand},
};
use tracing::{debug, warn};

use crate::{format::format_number, PageController, Reaction};

pub const COUNTER_SELECTOR: &str = ".credential-number";
pub const REVEAL_SELECTOR: &str = ".credential-card, .feature-card, .benefit-card, .diagram-step";
pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CounterAnimation {
    pub id: ElementId,
    pub target: u64,
    pub suffix: &'static str,
    /// Set from the first animation frame after the counter became visible.
    pub started_at_ms: Option<f64>,
}

/// Value shown `elapsed_ms` into a counter animation, and whether it is finished.
pub fn counter_value(target: u64, elapsed_ms: f64, duration_ms: u64) -> (u64, bool) {
    let progress = if duration_ms == 0 {
        1.0
    } else {
        (elapsed_ms / duration_ms as f64).clamp(0.0, 1.0)
    };
    if progress >= 1.0 {
        (target, true)
    } else {
        ((progress * target as f64).floor() as u64, false)
    }
}

impl PageController {
    pub(crate) fn init_counters(&mut self, reaction: &mut Reaction) {
        reaction.push(UiCommand::Observe {
            observer: ObserverKind::Counters,
            selector: COUNTER_SELECTOR.into(),
            options: ObserverOptions {
                threshold: 0.5,
                root_margin: "0px 0px -100px 0px".into(),
            },
        });
    }

    pub(crate) fn init_scroll_animations(&mut self, reaction: &mut Reaction) {
        reaction.push(UiCommand::AddClass {
            target: Target::all(REVEAL_SELECTOR),
            class: "fade-in".into(),
        });
        reaction.push(UiCommand::Observe {
            observer: ObserverKind::Reveal,
            selector: REVEAL_SELECTOR.into(),
            options: ObserverOptions {
                threshold: 0.1,
                root_margin: "0px 0px -50px 0px".into(),
            },
        });
    }

    pub(crate) fn init_lazy_images(&mut self, reaction: &mut Reaction) {
        reaction.push(UiCommand::Observe {
            observer: ObserverKind::LazyImages,
            selector: LAZY_IMAGE_SELECTOR.into(),
            options: ObserverOptions {
                threshold: 0.0,
                root_margin: "0px".into(),
            },
        });
    }

    pub(crate) fn on_intersected(
        &mut self,
        observer: ObserverKind,
        entries: Vec<IntersectionEntry>,
        reaction: &mut Reaction,
    ) {
        for entry in entries.into_iter().filter(|entry| entry.is_intersecting) {
            match observer {
                ObserverKind::Counters => self.start_counter(entry, reaction),
                ObserverKind::Reveal => {
                    for class in ["fade-in", "visible"] {
                        reaction.push(UiCommand::AddClass {
                            target: Target::Id(entry.id.clone()),
                            class: class.into(),
                        });
                    }
                }
                ObserverKind::LazyImages => {
                    let Some(src) = entry.dataset.get("src") else {
                        continue;
                    };
                    reaction.extend([
                        UiCommand::SetAttribute {
                            target: Target::Id(entry.id.clone()),
                            name: "src".into(),
                            value: src.clone(),
                        },
                        UiCommand::RemoveClass {
                            target: Target::Id(entry.id.clone()),
                            class: "lazy".into(),
                        },
                        UiCommand::Unobserve {
                            observer,
                            id: entry.id,
                        },
                    ]);
                }
            }
        }
    }

    fn start_counter(&mut self, entry: IntersectionEntry, reaction: &mut Reaction) {
        if self.state.animated_counters.contains(&entry.id) {
            return;
        }
        let Some(target) = entry
            .dataset
            .get("target")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
        else {
            warn!(id = %entry.id, "counter has no numeric data-target");
            return;
        };

        self.state.animated_counters.insert(entry.id.clone());
        let suffix = if target >= self.config.animation.counter_suffix_threshold {
            "+"
        } else {
            ""
        };
        debug!(id = %entry.id, target, "starting counter");
        self.state.running_counters.push(CounterAnimation {
            id: entry.id,
            target,
            suffix,
            started_at_ms: None,
        });
        self.request_frame(reaction);
    }

    fn request_frame(&mut self, reaction: &mut Reaction) {
        if !self.state.frame_requested {
            self.state.frame_requested = true;
            reaction.effect(Effect::RequestAnimationFrame);
        }
    }

    pub(crate) fn on_animation_frame(&mut self, now_ms: f64, reaction: &mut Reaction) {
        self.state.frame_requested = false;
        let duration_ms = self.config.animation.counter_duration_ms;
        let grouping = self.config.calculator.grouping;

        let mut running = std::mem::take(&mut self.state.running_counters);
        running.retain_mut(|counter| {
            let started = *counter.started_at_ms.get_or_insert(now_ms);
            let (value, done) = counter_value(counter.target, now_ms - started, duration_ms);
            reaction.push(UiCommand::SetText {
                target: Target::Id(counter.id.clone()),
                text: format!("{}{}", format_number(value, grouping), counter.suffix),
            });
            !done
        });
        self.state.running_counters = running;

        if !self.state.running_counters.is_empty() {
            self.request_frame(reaction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_progresses_linearly_and_lands_on_target() {
        assert_eq!(counter_value(5000, 0.0, 2000), (0, false));
        assert_eq!(counter_value(5000, 1000.0, 2000), (2500, false));
        assert_eq!(counter_value(25, 1999.0, 2000), (24, false));
        assert_eq!(counter_value(5000, 2000.0, 2000), (5000, true));
        assert_eq!(counter_value(5000, 9000.0, 2000), (5000, true));
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        assert_eq!(counter_value(42, 0.0, 0), (42, true));
    }
}
