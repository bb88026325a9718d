use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Interaction", inline)]
#[serde(default)]
/// Hover and click behaviour.
pub struct InteractionOptions {
    /// Names of the bodies the pointer ray is tested against.
    #[schemars(skip)]
    pub hit_test_bodies: Vec<String>,
    /// Whether clicking a hovered body opens its information overlay.
    #[schemars(title = "Click To Inspect")]
    pub click_to_inspect: bool,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            hit_test_bodies: vec!["earth".into(), "mars".into(), "jupiter".into()],
            click_to_inspect: true,
        }
    }
}
