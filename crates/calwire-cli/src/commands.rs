//! Command execution and output rendering.

use calwire_protocol::{
    CalDav, Calendar, Collection, Event, HttpTransport, Principal, PropertyMap, Resource,
    TimeRange, dav,
};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::cli::{Cli, Command};
use crate::config::ClientConfig;
use crate::error::{CliError, CliResult};

/// Runs one CLI command and returns what should be printed.
pub async fn run(cli: Cli, config: &ClientConfig) -> CliResult<String> {
    let dav_config = config.dav_config(cli.url.as_deref())?;
    let base = dav_config.url.clone();
    let caldav = CalDav::with_namespaces(HttpTransport::new(dav_config)?, config.namespace_table());

    debug!(base = %base, command = ?cli.command, "Running command");

    match cli.command {
        Command::Ls { path, calendars } => {
            let parent = Principal::new(target_url(&base, path.as_deref())?);
            let filter = calendars.then(dav::collection);
            let children = caldav.list_children(&parent, filter.as_ref()).await?;
            render_resources(&children, cli.json)
        }
        Command::Props { path, props, depth } => {
            let target = Principal::new(target_url(&base, Some(&path))?);
            let names = props
                .iter()
                .map(|p| caldav.namespaces().parse(p))
                .collect::<Result<Vec<_>, _>>()?;
            let map = caldav.fetch_properties(&target, &names, depth.into()).await?;
            render_properties(&map, cli.json)
        }
        Command::Search {
            calendar,
            start,
            end,
        } => {
            let calendar = Calendar::new(target_url(&base, Some(&calendar))?, None);
            let events = caldav
                .time_range_search(&calendar, TimeRange::new(start, end))
                .await?;
            render_events(&events, cli.json)
        }
        Command::Mkcalendar { name, parent, id } => {
            let parent = Principal::new(target_url(&base, parent.as_deref())?);
            let url = caldav
                .create_calendar(&parent, &name, id.as_deref())
                .await?
                .ok_or_else(|| CliError::NotCreated(format!("calendar {:?}", name)))?;
            render_created(&url, cli.json)
        }
        Command::Put { calendar, file, id } => {
            let data = std::fs::read_to_string(&file)?;
            let calendar = Calendar::new(target_url(&base, Some(&calendar))?, None);
            let url = caldav
                .create_event(&calendar, &data, id.as_deref())
                .await?
                .ok_or_else(|| CliError::NotCreated(format!("event from {}", file.display())))?;
            render_created(&url, cli.json)
        }
    }
}

/// Resolves a user-supplied path against the base URL.
pub fn target_url(base: &Url, path: Option<&str>) -> CliResult<Url> {
    match path {
        Some(path) => Principal::new(base.clone())
            .geturl(path)
            .map_err(CliError::from),
        None => Ok(base.clone()),
    }
}

pub fn render_resources(resources: &[Resource], as_json: bool) -> CliResult<String> {
    if as_json {
        let items: Vec<Value> = resources
            .iter()
            .map(|r| {
                json!({
                    "kind": if r.is_calendar() { "calendar" } else { "event" },
                    "url": r.url().as_str(),
                })
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&items)?);
    }

    Ok(resources
        .iter()
        .map(|r| {
            let kind = if r.is_calendar() { "calendar" } else { "event" };
            format!("{:<8} {}", kind, r.url())
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn render_properties(map: &PropertyMap, as_json: bool) -> CliResult<String> {
    if as_json {
        let value: serde_json::Map<String, Value> = map
            .iter()
            .map(|(href, props)| {
                let props: serde_json::Map<String, Value> = props
                    .iter()
                    .map(|(name, value)| (name.to_string(), json!(value)))
                    .collect();
                (href.clone(), Value::Object(props))
            })
            .collect();
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    let mut lines = Vec::new();
    for (href, props) in map {
        lines.push(href.clone());
        for (name, value) in props {
            lines.push(format!("  {} = {}", name, value.as_deref().unwrap_or("-")));
        }
    }
    Ok(lines.join("\n"))
}

pub fn render_events(events: &[Event], as_json: bool) -> CliResult<String> {
    if as_json {
        let items: Vec<Value> = events
            .iter()
            .map(|e| json!({ "url": e.url().as_str(), "data": e.data() }))
            .collect();
        return Ok(serde_json::to_string_pretty(&items)?);
    }

    Ok(events
        .iter()
        .map(|e| match e.data() {
            Some(data) => format!("{}\n{}", e.url(), data.trim_end()),
            None => e.url().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n\n"))
}

pub fn render_created(url: &Url, as_json: bool) -> CliResult<String> {
    if as_json {
        return Ok(serde_json::to_string_pretty(&json!({ "url": url.as_str() }))?);
    }
    Ok(url.to_string())
}
