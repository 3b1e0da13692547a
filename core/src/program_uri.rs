// Copyright 2025 HEM Sp. z o.o.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use log::debug;
use url::Url;

use crate::collaborators::{BrowseTree, SelectorParser};
use crate::definitions::{IdentifierType, ProgramType};
use crate::errors::ProgramUriError;
use crate::program::{Identifier, ProgramSelector};

pub const URI_SCHEME: &str = "broadcastradio";
pub const URI_AUTHORITY: &str = "program";
pub const ROOT_MEDIA_ID: &str = "__ROOT__";

/// Serializes a selector as `broadcastradio://program/<TYPE>/<hex value>[?<TYPE>=<hex value>...]`.
pub fn selector_to_uri(selector: &ProgramSelector) -> String {
    let primary = selector.primary_id();
    let mut uri = format!("{}://{}/{}/{:x}", URI_SCHEME, URI_AUTHORITY, primary.id_type.uri_name(), primary.value);
    let query: Vec<String> = selector.secondary_ids()
                                     .iter()
                                     .map(|id| format!("{}={:x}", id.id_type.uri_name(), id.value))
                                     .collect();
    if !query.is_empty() {
        uri.push('?');
        uri.push_str(&query.join("&"));
    }
    uri
}

pub fn selector_from_uri(uri: &str) -> Result<ProgramSelector, ProgramUriError> {
    let url = Url::parse(uri).map_err(|e| ProgramUriError::Malformed(e.to_string()))?;
    if url.scheme() != URI_SCHEME {
        return Err(ProgramUriError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.host_str() != Some(URI_AUTHORITY) {
        return Err(ProgramUriError::UnexpectedAuthority(url.host_str().map(str::to_string)));
    }

    let segments: Vec<&str> = url.path_segments()
                                 .map(|s| s.filter(|segment| !segment.is_empty()).collect())
                                 .unwrap_or_default();
    let [type_name, value] = segments.as_slice() else {
        return Err(ProgramUriError::WrongPathLength(segments.len()));
    };
    let primary = parse_identifier(type_name, value)?;
    let program_type = program_type_of(primary)
        .ok_or_else(|| ProgramUriError::UnsupportedPrimaryIdentifier(type_name.to_string()))?;

    let mut secondary_ids = Vec::new();
    for (name, value) in url.query_pairs() {
        match parse_identifier(&name, &value) {
            Ok(id) => secondary_ids.push(id),
            // unknown secondary identifiers do not invalidate the selector
            Err(e) => debug!("Skipping secondary identifier in {}: {}", uri, e),
        }
    }

    Ok(ProgramSelector::new(program_type, primary, secondary_ids))
}

fn parse_identifier(type_name: &str, value: &str) -> Result<Identifier, ProgramUriError> {
    let id_type = IdentifierType::from_uri_name(type_name)
        .ok_or_else(|| ProgramUriError::UnknownIdentifierType(type_name.to_string()))?;
    let value = u64::from_str_radix(value, 16)
        .map_err(|_| ProgramUriError::InvalidIdentifierValue(value.to_string()))?;
    Ok(Identifier::new(id_type, value))
}

fn program_type_of(primary: Identifier) -> Option<ProgramType> {
    match primary.id_type {
        IdentifierType::AmFmFrequency => Some(ProgramSelector::amfm(primary.value).program_type()),
        IdentifierType::RdsPi => Some(ProgramType::Fm),
        IdentifierType::HdStationIdExt => Some(ProgramType::FmHd),
        IdentifierType::DabSidExt => Some(ProgramType::Dab),
        IdentifierType::DrmoServiceId => Some(ProgramType::Drmo),
        IdentifierType::SxmServiceId => Some(ProgramType::Sxm),
        _ => None,
    }
}

/// Parses program URIs in the `broadcastradio` scheme.
#[derive(Debug, Default, Clone, Copy)]
pub struct BroadcastRadioUriParser;

impl SelectorParser for BroadcastRadioUriParser {
    fn parse_uri(&self, uri: &str) -> Option<ProgramSelector> {
        selector_from_uri(uri).map_err(|e| debug!("Cannot parse {}: {}", uri, e)).ok()
    }
}

/// Flat browse tree: one root node, programs addressed by their URI.
#[derive(Debug, Clone)]
pub struct ProgramBrowseTree {
    root_id: String,
}

impl ProgramBrowseTree {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self { root_id: root_id.into() }
    }

    pub fn media_id_of(&self, selector: &ProgramSelector) -> String {
        selector_to_uri(selector)
    }
}

impl Default for ProgramBrowseTree {
    fn default() -> Self {
        Self::new(ROOT_MEDIA_ID)
    }
}

impl BrowseTree for ProgramBrowseTree {
    fn root_id(&self) -> &str {
        &self.root_id
    }

    fn parse_media_id(&self, media_id: &str) -> Option<ProgramSelector> {
        if media_id == self.root_id {
            return None;
        }
        selector_from_uri(media_id).ok()
    }
}
