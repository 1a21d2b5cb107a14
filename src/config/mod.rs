use std::{collections::BTreeMap, path::PathBuf};

use eyre::{Result, WrapErr};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use microxdg::XdgApp;
use serde::{Deserialize, Serialize};

use crate::{
    registry::{Bundled, DefinitionSource, Directory},
    spec::Visibility,
};

#[derive(Debug, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Load the definitions compiled into the binary.
    pub bundled: bool,
    /// Extra directories with `*.json`/`*.yaml` definitions, loaded after
    /// the bundled ones.
    pub spec_dirs: Vec<PathBuf>,
    pub include_hidden: bool,
    /// Command name to version that `get` should prefer over the latest.
    pub pins: BTreeMap<String, String>,
}

impl Config {
    pub fn figment(xdg_app: &XdgApp) -> Result<Figment> {
        let config_folder = xdg_app
            .app_config()
            .wrap_err("locating the configuration folder")?;

        Ok(Self::figment_in(config_folder))
    }

    pub fn figment_in(config_folder: PathBuf) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_folder.join("config.toml")))
            .merge(Yaml::file(config_folder.join("config.yaml")))
            .merge(Yaml::file(config_folder.join("config.yml")))
            .merge(Json::file(config_folder.join("config.json")))
            .merge(Env::prefixed("COMPSPEC_"))
    }

    pub fn sources(&self) -> Vec<Box<dyn DefinitionSource>> {
        let mut sources: Vec<Box<dyn DefinitionSource>> = Vec::new();
        if self.bundled {
            sources.push(Box::new(Bundled));
        }
        for dir in &self.spec_dirs {
            sources.push(Box::new(Directory::new(dir.clone())));
        }
        sources
    }

    pub fn visibility(&self) -> Visibility {
        if self.include_hidden {
            Visibility::IncludeHidden
        } else {
            Visibility::Default
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bundled: true,
            spec_dirs: Vec::new(),
            include_hidden: false,
            pins: BTreeMap::new(),
        }
    }
}
