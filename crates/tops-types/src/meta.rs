//! Caller-supplied compilation metadata.
//!
//! The surrounding toolchain owns class layouts and enum definitions and
//! hands them to the compiler as read-only values (often deserialized
//! from JSON). Nothing here is mutated during compilation; one
//! [`GlobalInfo`] can back any number of concurrent function compiles.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One property of a Tops class: its declared type and byte offset
/// inside the instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    /// Tops type name (`int4`, `bool`, an enum type name, ...).
    #[serde(rename = "type")]
    pub ty: String,
    /// Byte offset of the property from the instance base address.
    pub offset: u32,
}

/// Layout metadata for one class-like aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ClassInfo {
    /// The class name, used to prefix emitted function names.
    pub class_name: String,
    /// Property name → type/offset.
    #[serde(default)]
    pub properties: HashMap<String, PropertyInfo>,
    /// Method name → full Tops function definition source.
    #[serde(default)]
    pub member_functions: HashMap<String, String>,
}

impl ClassInfo {
    /// Create an empty class with the given name.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: HashMap::new(),
            member_functions: HashMap::new(),
        }
    }

    /// Add a property (builder style, for tests and programmatic setup).
    pub fn with_property(mut self, name: impl Into<String>, ty: impl Into<String>, offset: u32) -> Self {
        self.properties.insert(
            name.into(),
            PropertyInfo {
                ty: ty.into(),
                offset,
            },
        );
        self
    }

    /// Add a member function source string.
    pub fn with_member_function(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.member_functions.insert(name.into(), source.into());
        self
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.get(name)
    }
}

/// Per-compilation context shared by every function compile: enum
/// definitions and class layouts, keyed by type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GlobalInfo {
    /// Enum type name → member name → integer value.
    #[serde(default)]
    pub enums: HashMap<String, HashMap<String, i64>>,
    /// Class name → layout.
    #[serde(default)]
    pub classes: HashMap<String, ClassInfo>,
}

impl GlobalInfo {
    /// Add an enum definition (builder style).
    pub fn with_enum(
        mut self,
        name: impl Into<String>,
        members: impl IntoIterator<Item = (&'static str, i64)>,
    ) -> Self {
        self.enums.insert(
            name.into(),
            members.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        );
        self
    }

    /// Add a class definition (builder style).
    pub fn with_class(mut self, class: ClassInfo) -> Self {
        self.classes.insert(class.class_name.clone(), class);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_info_builder() {
        let point = ClassInfo::new("Point")
            .with_property("x", "int4", 0)
            .with_property("y", "int4", 4);
        assert_eq!(point.property("x").unwrap().offset, 0);
        assert_eq!(point.property("y").unwrap().ty, "int4");
        assert!(point.property("z").is_none());
    }

    #[test]
    fn test_global_info_from_json() {
        let json = r#"{
            "enums": { "ColorTypes": { "red": 0, "green": 1, "blue": 2 } },
            "classes": {
                "Point": {
                    "class_name": "Point",
                    "properties": {
                        "x": { "type": "int4", "offset": 0 },
                        "y": { "type": "int4", "offset": 4 }
                    }
                }
            }
        }"#;
        let global: GlobalInfo = serde_json::from_str(json).unwrap();
        assert_eq!(global.enums["ColorTypes"]["blue"], 2);
        assert_eq!(global.classes["Point"].property("y").unwrap().offset, 4);
        assert!(global.classes["Point"].member_functions.is_empty());
    }
}
