use crate::config::MAX_CHANNELS;

/// Output channels of the dry bus, in bus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    FrontLeft,
    FrontRight,
    FrontCenter,
    Lfe,
    BackLeft,
    BackRight,
    BackCenter,
    SideLeft,
    SideRight,
}

impl Channel {
    pub const ALL: [Channel; MAX_CHANNELS] = [
        Channel::FrontLeft,
        Channel::FrontRight,
        Channel::FrontCenter,
        Channel::Lfe,
        Channel::BackLeft,
        Channel::BackRight,
        Channel::BackCenter,
        Channel::SideLeft,
        Channel::SideRight,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}
