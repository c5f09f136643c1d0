//! Multistatus response parsing.
//!
//! Every lookup here is a deep search, and every lookup is optional: a
//! response without `<href>` is skipped, and a property or calendar-data
//! element the server left out becomes `None`.

use std::collections::BTreeMap;

use tracing::warn;

use crate::namespace::{QualifiedName, caldav, dav};
use crate::tree::{Element, XmlTree};

/// Property values of one resource, keyed by requested name.
pub type Properties = BTreeMap<QualifiedName, Option<String>>;

/// Property values of every resource in a multistatus, keyed by href.
pub type PropertyMap = BTreeMap<String, Properties>;

/// Extracts the `requested` properties of every `<response>` in `tree`.
///
/// Each inner map holds exactly one entry per requested name.
pub fn parse_multistatus(tree: &XmlTree, requested: &[QualifiedName]) -> PropertyMap {
    let mut map = PropertyMap::new();

    for response in tree.find_all(&dav::response()) {
        let Some(href) = response_href(response) else {
            warn!("Skipping multistatus response without href");
            continue;
        };

        let properties = requested
            .iter()
            .map(|name| (name.clone(), response.find(name).and_then(property_value)))
            .collect();
        map.insert(href, properties);
    }

    map
}

/// Extracts `(href, calendar-data)` pairs from a calendar-query result.
///
/// Responses without calendar-data are kept with `None` so callers see one
/// entry per resource the server returned.
pub fn parse_calendar_data(tree: &XmlTree) -> Vec<(String, Option<String>)> {
    tree.find_all(&dav::response())
        .filter_map(|response| {
            let Some(href) = response_href(response) else {
                warn!("Skipping calendar-data response without href");
                return None;
            };
            let data = response
                .find(&caldav::calendar_data())
                .and_then(Element::text)
                .map(str::to_string);
            Some((href, data))
        })
        .collect()
}

/// Text if present, else the first child's qualified name, else nothing.
pub fn property_value(element: &Element) -> Option<String> {
    if let Some(text) = element.text() {
        return Some(text.to_string());
    }
    element.children().first().map(|child| child.name().to_string())
}

fn response_href(response: &Element) -> Option<String> {
    response
        .find(&dav::href())
        .and_then(Element::text)
        .map(|href| href.trim().to_string())
}
