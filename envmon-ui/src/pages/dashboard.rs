//! Dashboard Page
//!
//! Live view of one device: status cards, temperature and humidity charts and
//! a clock. Readings are polled for the selected device while the page is
//! mounted; changing the selection restarts the poll.

use chrono::{DateTime, Local};
use leptos::*;
use leptos_router::*;

use crate::api::{self, ChartPoint, ReadingsSnapshot};
use crate::components::chart::ChartSample;
use crate::components::{CardSkeleton, Chart, SignedInShell, StatusCard};
use crate::state::global::{choose_device, Device, GlobalState};
use crate::state::poller::{poll_interval, Poller, CLOCK_TICK_MS};
use crate::state::storage::{self, POLL_INTERVAL_KEY};

/// Samples requested per poll
const CHART_WINDOW: usize = 24;

/// "HH:MM" in local time, empty when the timestamp is missing or unreadable
fn time_label(timestamp: Option<&str>) -> String {
    timestamp
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|dt| dt.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}

/// One chart series picked out of the snapshot window
fn series(points: &[ChartPoint], value: impl Fn(&ChartPoint) -> f64) -> Vec<ChartSample> {
    points
        .iter()
        .map(|p| ChartSample {
            label: time_label(p.timestamp.as_deref()),
            value: value(p),
        })
        .collect()
}

/// Short relative age such as "12s ago" or "3m ago"
fn age_label(seconds: i64) -> String {
    match seconds {
        s if s < 5 => "just now".to_string(),
        s if s < 60 => format!("{}s ago", s),
        s if s < 3600 => format!("{}m ago", s / 60),
        s => format!("{}h ago", s / 3600),
    }
}

/// Dashboard page component
#[component]
pub fn Dashboard() -> impl IntoView {
    let state = use_context::<GlobalState>().expect("GlobalState not found");
    let query = use_query_map();
    let navigate = use_navigate();

    // Server list replaces the cache when signed in
    {
        let state = state.clone();
        spawn_local(async move {
            if let Err(e) = state.refresh_devices().await {
                state.show_error(&e);
            }
        });
    }

    let devices = state.devices;
    let last_selected = state.last_selected();
    let requested = move || query.with(|q| q.get("device").cloned());

    let selected = create_memo(move |_| {
        let requested = requested();
        devices.with(|list| {
            choose_device(list, requested.as_deref(), last_selected.as_deref())
                .and_then(|id| list.iter().find(|d| d.id == id).cloned())
        })
    });

    // Only the identity and locator should restart polling, not a rename
    let source = create_memo(move |_| {
        selected.with(|d| d.as_ref().map(|d| (d.id.clone(), d.script_url.clone())))
    });

    let snapshot = create_rw_signal(None::<ReadingsSnapshot>);
    let fetch_error = create_rw_signal(None::<String>);
    let fetched_at = create_rw_signal(None::<DateTime<Local>>);
    let now = create_rw_signal(Local::now());

    let readings = Poller::new(poll_interval(storage::read(POLL_INTERVAL_KEY)));
    let clock = Poller::new(CLOCK_TICK_MS);
    let generation = store_value(0u64);

    clock.start(move || now.set(Local::now()));

    let state_for_select = state.clone();
    create_effect(move |_| match source.get() {
        Some((id, locator)) => {
            state_for_select.remember_selection(&id);

            let gen = generation.get_value() + 1;
            generation.set_value(gen);
            snapshot.set(None);
            fetch_error.set(None);
            fetched_at.set(None);

            readings.start(move || {
                let locator = locator.clone();
                spawn_local(async move {
                    let result = api::fetch_readings(&locator, CHART_WINDOW).await;

                    // Drop answers for a previous selection or an unmounted view
                    if generation.try_get_value() != Some(gen) {
                        return;
                    }

                    match result {
                        Ok(data) => {
                            snapshot.set(Some(data));
                            fetch_error.set(None);
                            fetched_at.set(Some(Local::now()));
                        }
                        Err(e) => {
                            web_sys::console::error_1(&format!("Failed to fetch readings: {}", e).into());
                            fetch_error.set(Some(e));
                        }
                    }
                });
            });
        }
        None => {
            readings.stop();
            snapshot.set(None);
        }
    });

    let on_select = move |ev: ev::Event| {
        let id = event_target_value(&ev);
        navigate(&format!("/dashboard?device={}", id), Default::default());
    };

    let latest = move || snapshot.with(|s| s.as_ref().and_then(|s| s.latest.clone()));
    let status = move || snapshot.with(|s| s.as_ref().and_then(|s| s.status.clone()));

    let temperature = Signal::derive(move || latest().map(|r| format!("{:.1}", r.temperature)));
    let humidity = Signal::derive(move || latest().map(|r| format!("{:.1}", r.humidity)));
    let air_quality = Signal::derive(move || latest().map(|r| r.air_quality));
    let tvoc = Signal::derive(move || latest().map(|r| r.tvoc.to_string()));
    let eco2 = Signal::derive(move || latest().map(|r| r.eco2.to_string()));
    let tvoc_status = Signal::derive(move || status().map(|s| s.tvoc));
    let eco2_status = Signal::derive(move || status().map(|s| s.eco2));
    let air_status = Signal::derive(move || status().map(|s| s.air_quality));

    let temperature_series = Signal::derive(move || {
        snapshot.with(|s| s.as_ref().map(|s| series(&s.chart, |p| p.temperature)).unwrap_or_default())
    });
    let humidity_series = Signal::derive(move || {
        snapshot.with(|s| s.as_ref().map(|s| series(&s.chart, |p| p.humidity)).unwrap_or_default())
    });

    let last_updated = move || match fetched_at.get() {
        Some(at) => {
            let age = (now.get() - at).num_seconds().max(0);
            format!("Last updated {} ({})", at.format("%H:%M:%S"), age_label(age))
        }
        None => "Waiting for first reading".to_string(),
    };

    view! {
        <SignedInShell>
            <div class="space-y-8">
                <div class="flex flex-wrap items-center justify-between gap-4">
                    <div>
                        <h1 class="text-3xl font-bold">"Dashboard"</h1>
                        <p class="text-gray-400 mt-1">
                            {move || now.get().format("%A, %d %B %Y %H:%M:%S").to_string()}
                        </p>
                    </div>

                    <Show when=move || devices.with(|d| !d.is_empty())>
                        <select
                            class="bg-gray-800 border border-gray-600 rounded-lg px-4 py-2"
                            prop:value=move || selected.with(|d| d.as_ref().map(|d| d.id.clone()).unwrap_or_default())
                            on:change=on_select.clone()
                        >
                            {move || devices.get().into_iter().map(|d: Device| view! {
                                <option value=d.id.clone()>{d.name.clone()}</option>
                            }).collect_view()}
                        </select>
                    </Show>
                </div>

                <Show
                    when=move || selected.with(Option::is_some)
                    fallback=|| view! {
                        <section class="bg-gray-800 rounded-xl p-8 text-center">
                            <p class="text-gray-400 mb-4">"No devices yet."</p>
                            <A href="/devices" class="px-4 py-2 bg-cyan-600 hover:bg-cyan-700 rounded-lg">
                                "Add a device"
                            </A>
                        </section>
                    }
                >
                    <div class="flex items-center justify-between text-sm">
                        <span class="text-gray-400">{last_updated}</span>
                        {move || fetch_error.get().map(|e| view! {
                            <span class="text-red-400">{e}</span>
                        })}
                    </div>

                    <section class="grid grid-cols-2 md:grid-cols-5 gap-4">
                        {move || if snapshot.with(Option::is_none) && fetch_error.with(Option::is_none) {
                            (0..5).map(|_| view! { <CardSkeleton /> }).collect_view()
                        } else {
                            view! {
                                <StatusCard title="Temperature" icon="🌡️" value=temperature unit="°C" />
                                <StatusCard title="Humidity" icon="💧" value=humidity unit="%" />
                                <StatusCard title="Air Quality" icon="🍃" value=air_quality status=air_status />
                                <StatusCard title="TVOC" icon="🧪" value=tvoc unit="ppb" status=tvoc_status />
                                <StatusCard title="eCO2" icon="🫧" value=eco2 unit="ppm" status=eco2_status />
                            }.into_view()
                        }}
                    </section>

                    <section class="grid md:grid-cols-2 gap-6">
                        <Chart title="Temperature (°C)" color="#FF9800" samples=temperature_series />
                        <Chart title="Humidity (%)" color="#2196F3" samples=humidity_series />
                    </section>
                </Show>
            </div>
        </SignedInShell>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_label() {
        assert_eq!(age_label(0), "just now");
        assert_eq!(age_label(42), "42s ago");
        assert_eq!(age_label(125), "2m ago");
        assert_eq!(age_label(7300), "2h ago");
    }

    #[test]
    fn test_series_keeps_source_order() {
        let points = vec![
            ChartPoint { timestamp: None, temperature: 21.0, humidity: 40.0 },
            ChartPoint { timestamp: Some("not a date".into()), temperature: 22.5, humidity: 41.0 },
        ];

        let temps = series(&points, |p| p.temperature);
        assert_eq!(temps.iter().map(|s| s.value).collect::<Vec<_>>(), vec![21.0, 22.5]);
        assert!(temps.iter().all(|s| s.label.is_empty()));

        let humidity = series(&points, |p| p.humidity);
        assert_eq!(humidity[1].value, 41.0);
    }
}
