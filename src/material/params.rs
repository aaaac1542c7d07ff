//! Material parameter names shared by providers and the loader.

use super::key::{AlphaMode, MaterialKey};
use crate::engine::Shading;

pub const BASE_COLOR_FACTOR: &str = "baseColorFactor";
pub const METALLIC_FACTOR: &str = "metallicFactor";
pub const ROUGHNESS_FACTOR: &str = "roughnessFactor";
pub const SPECULAR_FACTOR: &str = "specularFactor";
pub const GLOSSINESS_FACTOR: &str = "glossinessFactor";
pub const EMISSIVE_FACTOR: &str = "emissiveFactor";
pub const NORMAL_SCALE: &str = "normalScale";
pub const AO_STRENGTH: &str = "aoStrength";
pub const ALPHA_CUTOFF: &str = "alphaCutoff";
pub const CLEAR_COAT_FACTOR: &str = "clearCoatFactor";
pub const CLEAR_COAT_ROUGHNESS_FACTOR: &str = "clearCoatRoughnessFactor";
pub const SHEEN_COLOR_FACTOR: &str = "sheenColorFactor";
pub const SHEEN_ROUGHNESS_FACTOR: &str = "sheenRoughnessFactor";
pub const TRANSMISSION_FACTOR: &str = "transmissionFactor";
pub const IOR: &str = "ior";
pub const THICKNESS_FACTOR: &str = "thicknessFactor";
pub const DOUBLE_SIDED: &str = "doubleSided";

/// Parameters every lit template declares
pub const LIT_CORE: &[&str] = &[
    BASE_COLOR_FACTOR,
    METALLIC_FACTOR,
    ROUGHNESS_FACTOR,
    EMISSIVE_FACTOR,
    NORMAL_SCALE,
    AO_STRENGTH,
];

pub const SPECULAR_GLOSSINESS_CORE: &[&str] = &[
    BASE_COLOR_FACTOR,
    SPECULAR_FACTOR,
    GLOSSINESS_FACTOR,
    EMISSIVE_FACTOR,
    NORMAL_SCALE,
    AO_STRENGTH,
];

pub const UNLIT_CORE: &[&str] = &[BASE_COLOR_FACTOR, EMISSIVE_FACTOR];

pub const EXTENDED: &[&str] = &[
    CLEAR_COAT_FACTOR,
    CLEAR_COAT_ROUGHNESS_FACTOR,
    SHEEN_COLOR_FACTOR,
    SHEEN_ROUGHNESS_FACTOR,
    TRANSMISSION_FACTOR,
    IOR,
    THICKNESS_FACTOR,
];

/// Exactly the parameters a template built for `key` needs
pub fn parameters_for(key: &MaterialKey) -> Vec<String> {
    let core = if key.unlit {
        UNLIT_CORE
    } else if key.use_specular_glossiness {
        SPECULAR_GLOSSINESS_CORE
    } else {
        LIT_CORE
    };

    let mut names: Vec<&str> = core.to_vec();
    if key.alpha_mode == AlphaMode::Mask {
        names.push(ALPHA_CUTOFF);
    }
    if !key.unlit {
        if key.has_clear_coat {
            names.extend([CLEAR_COAT_FACTOR, CLEAR_COAT_ROUGHNESS_FACTOR]);
        }
        if key.has_sheen {
            names.extend([SHEEN_COLOR_FACTOR, SHEEN_ROUGHNESS_FACTOR]);
        }
        if key.has_transmission {
            names.push(TRANSMISSION_FACTOR);
        }
        if key.has_ior {
            names.push(IOR);
        }
        if key.has_volume {
            names.push(THICKNESS_FACTOR);
        }
    }

    names.into_iter().map(str::to_string).collect()
}
/// Every parameter a template of the given shading could use. For
/// templates built outside a provider, where no key is available.
pub fn parameters_for_shading(shading: Shading) -> Vec<String> {
    let core = match shading {
        Shading::Lit => LIT_CORE,
        Shading::Unlit => UNLIT_CORE,
        Shading::SpecularGlossiness => SPECULAR_GLOSSINESS_CORE,
    };

    let mut names: Vec<&str> = core.to_vec();
    names.extend([ALPHA_CUTOFF, DOUBLE_SIDED]);
    if shading == Shading::Lit {
        names.extend(EXTENDED);
    }
    names.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_key_declares_cutoff() {
        let key = MaterialKey {
            alpha_mode: AlphaMode::Mask,
            ..Default::default()
        };
        let params = parameters_for(&key);
        assert!(params.iter().any(|p| p == ALPHA_CUTOFF));
        assert!(params.iter().any(|p| p == METALLIC_FACTOR));
    }

    #[test]
    fn test_unlit_ignores_extensions() {
        let key = MaterialKey {
            unlit: true,
            has_clear_coat: true,
            ..Default::default()
        };
        let params = parameters_for(&key);
        assert_eq!(params.len(), UNLIT_CORE.len());
    }

    #[test]
    fn test_shading_parameters() {
        let lit = parameters_for_shading(Shading::Lit);
        assert!(lit.iter().any(|p| p == IOR));

        let unlit = parameters_for_shading(Shading::Unlit);
        assert!(!unlit.iter().any(|p| p == IOR));
        assert!(unlit.iter().any(|p| p == DOUBLE_SIDED));
    }
}
