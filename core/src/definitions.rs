use bitflags::bitflags;

bitflags! {
    /// Transport actions advertised together with every published playback state.
    #[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
    pub struct TransportActions: u32 {
        const Stop = 0x0001;
        const Play = 0x0004;
        const SkipToPrevious = 0x0010;
        const SkipToNext = 0x0020;
        const SetRating = 0x0080;
        const PlayFromMediaId = 0x0400;
        const PlayFromUri = 0x2000;
    }
}

impl TransportActions {
    /// Actions a live tuner supports. Pause is left out, it is reserved for time-shifted playback.
    pub const TUNER: TransportActions = TransportActions::Stop
        .union(TransportActions::Play)
        .union(TransportActions::SkipToPrevious)
        .union(TransportActions::SkipToNext)
        .union(TransportActions::SetRating)
        .union(TransportActions::PlayFromMediaId)
        .union(TransportActions::PlayFromUri);
}

/// Metadata fields a tuner may report for the current program.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum MetadataKey {
    RdsProgramService = 0x01,
    RdsRadioText = 0x02,
    Title = 0x03,
    Artist = 0x04,
    Album = 0x05,
    Genre = 0x06,
    Art = 0x07,
    ProgramName = 0x10,
    DabEnsembleName = 0x11,
    DabServiceName = 0x12,
    DabComponentName = 0x13,
}

/// Program name priority used when picking a single display title.
///
/// RDS_PS is often used to scroll the RDS_RT text in some regions, so it goes last to keep the
/// displayed name from churning every few hundred milliseconds.
pub const PROGRAM_NAME_ORDER: [MetadataKey; 6] = [
    MetadataKey::ProgramName,
    MetadataKey::DabComponentName,
    MetadataKey::DabServiceName,
    MetadataKey::DabEnsembleName,
    MetadataKey::RdsRadioText,
    MetadataKey::RdsProgramService,
];

#[repr(u8)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ProgramType {
    Am = 1,
    Fm = 2,
    AmHd = 3,
    FmHd = 4,
    Dab = 5,
    Drmo = 6,
    Sxm = 7,
}

#[repr(u32)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum IdentifierType {
    AmFmFrequency = 1,
    RdsPi = 2,
    HdStationIdExt = 3,
    DabSidExt = 5,
    DabEnsemble = 6,
    DabScid = 7,
    DabFrequency = 8,
    DrmoServiceId = 9,
    DrmoFrequency = 10,
    SxmServiceId = 12,
    SxmChannel = 13,
}

impl IdentifierType {
    const ALL: [IdentifierType; 11] = [
        IdentifierType::AmFmFrequency,
        IdentifierType::RdsPi,
        IdentifierType::HdStationIdExt,
        IdentifierType::DabSidExt,
        IdentifierType::DabEnsemble,
        IdentifierType::DabScid,
        IdentifierType::DabFrequency,
        IdentifierType::DrmoServiceId,
        IdentifierType::DrmoFrequency,
        IdentifierType::SxmServiceId,
        IdentifierType::SxmChannel,
    ];

    /// Name used in program URIs.
    pub fn uri_name(&self) -> &'static str {
        match self {
            IdentifierType::AmFmFrequency => "AMFM_FREQUENCY",
            IdentifierType::RdsPi => "RDS_PI",
            IdentifierType::HdStationIdExt => "HD_STATION_ID_EXT",
            IdentifierType::DabSidExt => "DAB_SID_EXT",
            IdentifierType::DabEnsemble => "DAB_ENSEMBLE",
            IdentifierType::DabScid => "DAB_SCID",
            IdentifierType::DabFrequency => "DAB_FREQUENCY",
            IdentifierType::DrmoServiceId => "DRMO_SERVICE_ID",
            IdentifierType::DrmoFrequency => "DRMO_FREQUENCY",
            IdentifierType::SxmServiceId => "SXM_SERVICE_ID",
            IdentifierType::SxmChannel => "SXM_CHANNEL",
        }
    }

    pub fn from_uri_name(name: &str) -> Option<IdentifierType> {
        Self::ALL.iter().copied().find(|t| t.uri_name() == name)
    }
}

/// Playback states published by the session.
///
/// Discriminants follow the platform media-session numbering, so raw codes coming from the tuner
/// service map onto them directly. Codes missing here (fast forwarding, rewinding, buffering and
/// anything unknown) are rejected by the reducer.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlaybackState {
    /// No program has been played yet.
    #[default]
    None = 0,
    Stopped = 1,
    Paused = 2,
    Playing = 3,
    /// A selection or tuning failure. Only ever published as a one-shot pulse.
    Error = 7,
    Connecting = 8,
    SkippingToPrevious = 9,
    SkippingToNext = 10,
}

/// Presentation class of a playback state, used by play/pause style controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualClass {
    Playing,
    Paused,
    Disabled,
}
