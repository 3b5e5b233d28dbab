//! Topic vocabulary of the portal.
//!
//! Built-in topics carry the slug the portal uses in its search URLs
//! (`/search/field_topic/{slug}/type/dataset`). Topics published after this
//! list was written are reachable through [`Category::Custom`].

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A portal topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Gobernabilidad,
    EconomiaYFinanzas,
    DesarrolloSocial,
    ExpresatePeru,
    Transporte,
    MedioAmbiente,
    Salud,
    Educacion,
    DesarrolloUrbano,
    AguaYSaneamiento,
    Covid,
    Energia,
    CienciaYTecnologia,
    AlimentacionYNutricion,
    ModeloDeGestionDocumental,
    /// Any other topic slug.
    Custom(String),
}

/// Error returned when a category string is empty.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("category must be a non-empty name or slug")]
pub struct EmptyCategory;

impl Category {
    /// Every built-in topic, in portal order.
    pub const BUILT_IN: [Category; 15] = [
        Self::Gobernabilidad,
        Self::EconomiaYFinanzas,
        Self::DesarrolloSocial,
        Self::ExpresatePeru,
        Self::Transporte,
        Self::MedioAmbiente,
        Self::Salud,
        Self::Educacion,
        Self::DesarrolloUrbano,
        Self::AguaYSaneamiento,
        Self::Covid,
        Self::Energia,
        Self::CienciaYTecnologia,
        Self::AlimentacionYNutricion,
        Self::ModeloDeGestionDocumental,
    ];

    /// Creates a custom topic from a slug.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyCategory`] for a blank slug.
    pub fn custom(slug: impl Into<String>) -> Result<Self, EmptyCategory> {
        let slug = slug.into().trim().to_string();
        if slug.is_empty() {
            return Err(EmptyCategory);
        }
        Ok(Self::Custom(slug))
    }

    /// Slug used in portal URLs.
    #[must_use]
    pub fn slug(&self) -> &str {
        match self {
            Self::Gobernabilidad => "gobernabilidad-24",
            Self::EconomiaYFinanzas => "economía-y-finanzas-29",
            Self::DesarrolloSocial => "desarrollo-social-338",
            Self::ExpresatePeru => "exprésate-perú-con-datos-1466",
            Self::Transporte => "transporte-25",
            Self::MedioAmbiente => "medio-ambiente-y-recursos-naturales-30",
            Self::Salud => "salud-27",
            Self::Educacion => "educación-28",
            Self::DesarrolloUrbano => "desarrollo-urbano-339",
            Self::AguaYSaneamiento => "agua-y-saneamiento-26",
            Self::Covid => "covid-19-917",
            Self::Energia => "energía-340",
            Self::CienciaYTecnologia => "ciencia-y-tecnología-1136",
            Self::AlimentacionYNutricion => "alimentación-y-nutrición-32",
            Self::ModeloDeGestionDocumental => "modelo-de-gestión-documental-1479",
            Self::Custom(slug) => slug,
        }
    }

    /// Constant-style name (`SALUD`, `ECONOMIA_Y_FINANZAS`, ...).
    #[must_use]
    pub fn constant_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Gobernabilidad => "GOBERNABILIDAD",
            Self::EconomiaYFinanzas => "ECONOMIA_Y_FINANZAS",
            Self::DesarrolloSocial => "DESARROLLO_SOCIAL",
            Self::ExpresatePeru => "EXPRESATE_PERU",
            Self::Transporte => "TRANSPORTE",
            Self::MedioAmbiente => "MEDIO_AMBIENTE",
            Self::Salud => "SALUD",
            Self::Educacion => "EDUCACION",
            Self::DesarrolloUrbano => "DESARROLLO_URBANO",
            Self::AguaYSaneamiento => "AGUA_Y_SANEAMIENTO",
            Self::Covid => "COVID",
            Self::Energia => "ENERGIA",
            Self::CienciaYTecnologia => "CIENCIA_Y_TECNOLOGIA",
            Self::AlimentacionYNutricion => "ALIMENTACION_Y_NUTRICION",
            Self::ModeloDeGestionDocumental => "MODELO_DE_GESTION_DOCUMENTAL",
            Self::Custom(_) => return None,
        })
    }

    /// Returns true for topics in [`Category::BUILT_IN`].
    #[must_use]
    pub fn is_built_in(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = EmptyCategory;

    /// Accepts a constant name (case-insensitive) or a slug; unknown slugs
    /// become [`Category::Custom`].
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Err(EmptyCategory);
        }
        let upper = value.to_uppercase().replace('-', "_");
        let built_in = Self::BUILT_IN.iter().find(|category| {
            category.slug() == value || category.constant_name() == Some(upper.as_str())
        });
        Ok(built_in.cloned().unwrap_or_else(|| Self::Custom(value.to_string())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constant_name_and_slug() {
        assert_eq!("SALUD".parse::<Category>().unwrap(), Category::Salud);
        assert_eq!("salud".parse::<Category>().unwrap(), Category::Salud);
        assert_eq!("salud-27".parse::<Category>().unwrap(), Category::Salud);
        assert_eq!(
            "economía-y-finanzas-29".parse::<Category>().unwrap(),
            Category::EconomiaYFinanzas
        );
        assert_eq!(
            "medio-ambiente".parse::<Category>().unwrap(),
            Category::MedioAmbiente
        );
    }

    #[test]
    fn test_unknown_slug_becomes_custom() {
        let category = "turismo-1500".parse::<Category>().unwrap();
        assert_eq!(category, Category::Custom("turismo-1500".into()));
        assert!(!category.is_built_in());
        assert_eq!(category.slug(), "turismo-1500");
    }

    #[test]
    fn test_empty_category_rejected() {
        assert_eq!("  ".parse::<Category>(), Err(EmptyCategory));
        assert_eq!(Category::custom(""), Err(EmptyCategory));
    }

    #[test]
    fn test_built_in_slugs_are_unique() {
        let mut slugs: Vec<&str> = Category::BUILT_IN.iter().map(Category::slug).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), Category::BUILT_IN.len());
    }
}
