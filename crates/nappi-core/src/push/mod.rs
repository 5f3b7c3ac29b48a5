//! Background push notifications: the delivery gateway and subscription
//! registration.

mod gateway;
mod registrar;

pub use gateway::{
    Interaction, NotificationAction, NotificationSurface, PushGateway, RenderedNotification,
    WindowRegistry, DEFAULT_ICON, FALLBACK_BODY, FALLBACK_TITLE, VIBRATION_PATTERN,
};
pub use registrar::{PushRegistrar, SubscriptionProvider};
