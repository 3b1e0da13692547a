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

use std::collections::BTreeMap;
use std::fmt;

use crate::definitions::{IdentifierType, MetadataKey, ProgramType, PROGRAM_NAME_ORDER};

const AM_LOWER_LIMIT_KHZ: u64 = 150;
const AM_UPPER_LIMIT_KHZ: u64 = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub id_type: IdentifierType,
    pub value: u64,
}

impl Identifier {
    pub fn new(id_type: IdentifierType, value: u64) -> Self {
        Self { id_type, value }
    }
}

/// Opaque identifier of a tunable program. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramSelector {
    program_type: ProgramType,
    primary_id: Identifier,
    secondary_ids: Vec<Identifier>,
}

impl ProgramSelector {
    pub fn new(program_type: ProgramType, primary_id: Identifier, secondary_ids: Vec<Identifier>) -> Self {
        Self { program_type, primary_id, secondary_ids }
    }

    /// Analog AM or FM selector for a frequency in kHz.
    pub fn amfm(frequency_khz: u64) -> Self {
        let program_type = if is_am_frequency(frequency_khz) { ProgramType::Am } else { ProgramType::Fm };
        Self::new(program_type, Identifier::new(IdentifierType::AmFmFrequency, frequency_khz), Vec::new())
    }

    pub fn program_type(&self) -> ProgramType {
        self.program_type
    }

    pub fn primary_id(&self) -> Identifier {
        self.primary_id
    }

    pub fn secondary_ids(&self) -> &[Identifier] {
        &self.secondary_ids
    }

    /// Short human readable name of the selector itself, e.g. "88.5 FM" or "1010 AM".
    pub fn display_name(&self) -> String {
        let id = self.primary_id;
        if id.id_type != IdentifierType::AmFmFrequency {
            return format!("{:X}", id.value);
        }
        if is_am_frequency(id.value) {
            format!("{} AM", id.value)
        } else {
            let mhz = id.value / 1000;
            let fraction = (id.value % 1000) / 100;
            format!("{}.{} FM", mhz, fraction)
        }
    }
}

impl fmt::Display for ProgramSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}:{}={}", self.program_type, self.primary_id.id_type.uri_name(), self.primary_id.value)
    }
}

fn is_am_frequency(frequency_khz: u64) -> bool {
    (AM_LOWER_LIMIT_KHZ..=AM_UPPER_LIMIT_KHZ).contains(&frequency_khz)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Text(String),
    Int(u64),
}

impl MetadataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetadataValue::Text(text) => Some(text.as_str()),
            MetadataValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<u64> {
        match self {
            MetadataValue::Int(value) => Some(*value),
            MetadataValue::Text(_) => None,
        }
    }
}

/// Point-in-time description of the tuned program.
///
/// A new `ProgramInfo` replaces the previous one as a whole; the `with_*` builders are only meant
/// for construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    selector: ProgramSelector,
    metadata: BTreeMap<MetadataKey, MetadataValue>,
}

impl ProgramInfo {
    pub fn new(selector: ProgramSelector) -> Self {
        Self { selector, metadata: BTreeMap::new() }
    }

    pub fn with_text(mut self, key: MetadataKey, text: impl Into<String>) -> Self {
        self.metadata.insert(key, MetadataValue::Text(text.into()));
        self
    }

    pub fn with_int(mut self, key: MetadataKey, value: u64) -> Self {
        self.metadata.insert(key, MetadataValue::Int(value));
        self
    }

    pub fn selector(&self) -> &ProgramSelector {
        &self.selector
    }

    pub fn metadata(&self) -> &BTreeMap<MetadataKey, MetadataValue> {
        &self.metadata
    }

    pub fn text(&self, key: MetadataKey) -> Option<&str> {
        self.metadata.get(&key).and_then(MetadataValue::as_text)
    }

    pub fn int(&self, key: MetadataKey) -> Option<u64> {
        self.metadata.get(&key).and_then(MetadataValue::as_int)
    }

    /// Program name picked with [`PROGRAM_NAME_ORDER`], if any name-like field is populated.
    pub fn program_name(&self) -> Option<&str> {
        select_display_name(&self.metadata, &PROGRAM_NAME_ORDER)
    }

    /// Program name, or the selector's own name when the tuner reported none.
    pub fn display_name(&self) -> String {
        match self.program_name() {
            Some(name) => name.to_string(),
            None => self.selector.display_name(),
        }
    }
}

/// Returns the first non-empty text field following `order`.
pub fn select_display_name<'a>(metadata: &'a BTreeMap<MetadataKey, MetadataValue>, order: &[MetadataKey])
    -> Option<&'a str>
{
    order.iter()
         .filter_map(|key| metadata.get(key).and_then(MetadataValue::as_text))
         .find(|text| !text.is_empty())
}

/// Program as kept by the favorites store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program {
    pub selector: ProgramSelector,
    pub name: String,
}

impl Program {
    pub fn new(selector: ProgramSelector, name: impl Into<String>) -> Self {
        Self { selector, name: name.into() }
    }

    pub fn from_program_info(info: &ProgramInfo) -> Self {
        Self::new(info.selector().clone(), info.program_name().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [(MetadataKey, &str); 6] = [
        (MetadataKey::ProgramName, "program"),
        (MetadataKey::DabComponentName, "component"),
        (MetadataKey::DabServiceName, "service"),
        (MetadataKey::DabEnsembleName, "ensemble"),
        (MetadataKey::RdsRadioText, "radio text"),
        (MetadataKey::RdsProgramService, "ps"),
    ];

    fn info_with_subset(mask: u32) -> ProgramInfo {
        let mut info = ProgramInfo::new(ProgramSelector::amfm(101_100));
        for (bit, (key, text)) in NAMES.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                info = info.with_text(*key, *text);
            }
        }
        info
    }

    #[test]
    fn program_name_is_first_populated_field_for_every_subset_of_name_fields() {
        for mask in 0..(1u32 << NAMES.len()) {
            let info = info_with_subset(mask);
            let expected = NAMES.iter()
                                .enumerate()
                                .find(|(bit, _)| mask & (1 << bit) != 0)
                                .map(|(_, (_, text))| *text);
            assert_eq!(info.program_name(), expected, "subset mask {:#08b}", mask);
        }
    }

    #[test]
    fn program_name_order_puts_rds_program_service_last() {
        assert_eq!(PROGRAM_NAME_ORDER.last(), Some(&MetadataKey::RdsProgramService));
        assert_eq!(PROGRAM_NAME_ORDER.first(), Some(&MetadataKey::ProgramName));
    }

    #[test]
    fn empty_name_fields_are_skipped() {
        let info = ProgramInfo::new(ProgramSelector::amfm(101_100))
            .with_text(MetadataKey::ProgramName, "")
            .with_text(MetadataKey::RdsProgramService, "KXYZ");
        assert_eq!(info.program_name(), Some("KXYZ"));
    }

    #[test]
    fn display_name_falls_back_to_selector_name_when_no_name_is_reported() {
        let fm = ProgramInfo::new(ProgramSelector::amfm(88_500));
        assert_eq!(fm.display_name(), "88.5 FM");

        let am = ProgramInfo::new(ProgramSelector::amfm(1010));
        assert_eq!(am.display_name(), "1010 AM");

        let dab = ProgramInfo::new(ProgramSelector::new(
            ProgramType::Dab, Identifier::new(IdentifierType::DabSidExt, 0xE1C238), Vec::new()));
        assert_eq!(dab.display_name(), "E1C238");
    }

    #[test]
    fn amfm_selector_picks_band_from_frequency() {
        assert_eq!(ProgramSelector::amfm(540).program_type(), ProgramType::Am);
        assert_eq!(ProgramSelector::amfm(97_900).program_type(), ProgramType::Fm);
    }

    #[test]
    fn program_from_program_info_uses_program_name() {
        let info = ProgramInfo::new(ProgramSelector::amfm(97_900))
            .with_text(MetadataKey::RdsProgramService, "ROCK")
            .with_text(MetadataKey::Title, "Song");
        let program = Program::from_program_info(&info);
        assert_eq!(program.name, "ROCK");
        assert_eq!(program.selector, ProgramSelector::amfm(97_900));
    }
}
