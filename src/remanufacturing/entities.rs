use super::quality::Grade;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    A,
    B,
    C,
}

impl ComponentType {
    pub const ALL: [ComponentType; 3] = [ComponentType::A, ComponentType::B, ComponentType::C];
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentType::A => write!(f, "Component_A"),
            ComponentType::B => write!(f, "Component_B"),
            ComponentType::C => write!(f, "Component_C"),
        }
    }
}

/// A returned unit entering the line
#[derive(Debug, Clone, PartialEq)]
pub struct Core {
    pub id: Uuid,
    /// Set at cleaning & inspection
    pub general_condition: Option<Grade>,
}

impl Core {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            general_condition: None,
        }
    }

    pub fn condition(&self) -> Grade {
        self.general_condition
            .unwrap_or_else(|| panic!("core {} left cleaning & inspection ungraded", self.id))
    }
}

impl Default for Core {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: Uuid,
    pub component_type: ComponentType,
    /// Set at component cleaning, or `High` for purchased units
    pub general_condition: Option<Grade>,
    pub repair_attempts: u32,
}

impl Component {
    /// A component freshly separated from a core
    pub fn new(component_type: ComponentType) -> Self {
        Self {
            id: Uuid::new_v4(),
            component_type,
            general_condition: None,
            repair_attempts: 0,
        }
    }

    /// A purchased replacement unit
    pub fn purchased(component_type: ComponentType) -> Self {
        Self {
            general_condition: Some(Grade::High),
            ..Self::new(component_type)
        }
    }

    pub fn is(&self, component_type: ComponentType) -> bool {
        self.component_type == component_type
    }

    pub fn condition(&self) -> Grade {
        self.general_condition
            .unwrap_or_else(|| panic!("component {} reached inspection uncleaned", self.id))
    }
}

/// An assembled unit
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
}

impl Product {
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

impl Default for Product {
    fn default() -> Self {
        Self::new()
    }
}
