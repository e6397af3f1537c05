//! Macro para declarar artifacts tipados sin boilerplate.
//!
//! ```ignore
//! use pipeline_core::typed_artifact;
//! typed_artifact!(DatasetManifest { keys: Vec<String> } kind: ArtifactKind::DatasetManifest);
//! ```

/// Declara un Artifact tipado con derives, campo `schema_version` e
/// `ArtifactSpec`.
///
/// Formas soportadas:
/// - typed_artifact!(Name { field1: Ty1, field2: Ty2 }); // KIND = GenericJson
/// - typed_artifact!(Name { field1: Ty1 } kind: $kind_expr );
#[macro_export]
macro_rules! typed_artifact {
    ($(#[$meta:meta])* $name:ident { $($fname:ident : $fty:ty),+ $(,)? } kind: $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name { $(pub $fname: $fty,)+ pub schema_version: u32 }
        impl $crate::model::ArtifactSpec for $name {
            const KIND: $crate::model::ArtifactKind = $kind;
        }
    };
    ($(#[$meta:meta])* $name:ident { $($fname:ident : $fty:ty),+ $(,)? }) => {
        $crate::typed_artifact!($(#[$meta])* $name { $($fname : $fty),+ } kind: $crate::model::ArtifactKind::GenericJson);
    };
}

#[cfg(test)]
mod tests {
    use crate::model::{ArtifactKind, ArtifactSpec};

    crate::typed_artifact!(
        /// Artifact de prueba.
        Probe { value: i64 } kind: ArtifactKind::EvaluationReport
    );

    #[test]
    fn macro_declares_a_typed_artifact() {
        let art = Probe { value: 3, schema_version: 1 }.into_artifact().unwrap();
        assert_eq!(art.kind, ArtifactKind::EvaluationReport);
        assert_eq!(Probe::from_artifact(&art).unwrap().value, 3);
    }
}
