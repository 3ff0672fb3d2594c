//! Four-phase scenario preload: media, model data, model assets, model motions.

use std::{
    collections::{BTreeMap, BTreeSet},
    future::Future,
    sync::Arc,
};

use tracing::{info, instrument, warn};

use crate::{
    assets::{
        decode::decode_image,
        fetch::{AssetUrlResolver, Fetcher, StoryRef, VoiceLocator},
        preload::PreloadQueue,
        resolve,
        store::{AssetKind, AssetStore, PreparedAsset, PreparedImage, PreparedSound},
    },
    config::PlayerSettings,
    foundation::error::{StageError, StageResult},
    model::{
        data::{
            ExpressionClip, ModelBuildData, ModelBundle, ModelLibrary, MotionCatalog, MotionClip,
        },
        prune::{prune_catalog, used_motions},
    },
    scenario::{
        model::{Scenario, SpecialEffectType},
        normalize::{Action, NormalizedScenario, normalize},
    },
};

/// Everything a controller needs, fully in memory.
#[derive(Debug)]
pub struct ControllerData {
    pub story: StoryRef,
    pub scenario: Scenario,
    pub script: NormalizedScenario,
    pub resources: AssetStore,
    pub models: ModelLibrary,
}

/// Media a script references, by kind.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MediaRefs {
    pub backgrounds: BTreeSet<String>,
    pub bgm: BTreeSet<String>,
    /// `(bundle, name)`
    pub se: BTreeSet<(String, String)>,
    pub voices: BTreeSet<String>,
}

impl MediaRefs {
    pub fn collect(script: &NormalizedScenario) -> Self {
        let mut refs = Self::default();
        for action in script.entries.iter().flat_map(|e| e.actions.iter()) {
            match action {
                Action::Effect(e) => match e.effect_type {
                    SpecialEffectType::ChangeBackground
                    | SpecialEffectType::ChangeBackgroundStill
                    | SpecialEffectType::ChangeCardStill
                        if !e.string_val.is_empty() =>
                    {
                        refs.backgrounds.insert(e.string_val.clone());
                    }
                    SpecialEffectType::FullScreenText if !e.string_val_sub.is_empty() => {
                        refs.voices.insert(e.string_val_sub.clone());
                    }
                    _ => {}
                },
                Action::Sound(s) => {
                    if !s.bgm.is_empty() {
                        refs.bgm.insert(s.bgm.clone());
                    }
                    if !s.se.is_empty() {
                        refs.se.insert((s.se_bundle_name.clone(), s.se.clone()));
                    }
                }
                Action::Talk(t) => {
                    refs.voices
                        .extend(t.voices.iter().map(|v| v.voice_id.clone()).filter(|v| !v.is_empty()));
                }
                _ => {}
            }
        }
        refs
    }
}

enum Fetched {
    Image(String, PreparedImage),
    Sound(String, PreparedSound),
    Build(String, ModelBuildData),
    Catalog(String, MotionCatalog),
    Moc(String, Vec<u8>),
    Texture(String, usize, PreparedImage),
    Motion(String, String, MotionClip),
    Expression(String, String, ExpressionClip),
}

/// Fetches a scenario and everything it references through the host's capabilities.
#[derive(Clone)]
pub struct Preloader {
    fetcher: Arc<dyn Fetcher>,
    urls: Arc<dyn AssetUrlResolver>,
    voices: Arc<dyn VoiceLocator>,
    settings: PlayerSettings,
}

impl std::fmt::Debug for Preloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preloader")
            .field("concurrency", &self.settings.preload_concurrency)
            .field("timeout", &self.settings.preload_timeout())
            .finish()
    }
}

impl Preloader {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        urls: Arc<dyn AssetUrlResolver>,
        voices: Arc<dyn VoiceLocator>,
        settings: &PlayerSettings,
    ) -> Self {
        Self {
            fetcher,
            urls,
            voices,
            settings: settings.clone(),
        }
    }

    fn get(&self, rel: &str) -> impl Future<Output = StageResult<Vec<u8>>> + Send + 'static {
        self.fetcher.fetch(&self.urls.resolve(rel))
    }

    /// Fetch and parse the script. Failures here propagate to the host.
    pub async fn fetch_scenario(&self, story: &StoryRef) -> StageResult<Scenario> {
        let bytes = self
            .get(&story.scenario_url)
            .await
            .map_err(|e| StageError::scenario(format!("{}: {e}", story.scenario_url)))?;
        Scenario::from_json_slice(&bytes)
    }

    #[instrument(skip(self), fields(scenario = %story.scenario_url))]
    pub async fn load(&self, story: &StoryRef) -> StageResult<ControllerData> {
        let scenario = self.fetch_scenario(story).await?;
        let script = normalize(&scenario);
        let mut queue: PreloadQueue<Fetched> = PreloadQueue::new(
            self.settings.preload_concurrency,
            self.settings.preload_timeout(),
        );

        let resources = self.media_phase(&mut queue, story, &script).await;
        info!(assets = resources.len(), "media preloaded");

        let costumes = script.costumes();
        let (builds, catalogs) = self.model_data_phase(&mut queue, &costumes).await;
        info!(models = builds.len(), catalogs = catalogs.len(), "model data preloaded");

        let used = used_motions(&script);
        let pruned: BTreeMap<String, MotionCatalog> = builds
            .keys()
            .map(|costume| {
                let base = resolve::motion_base_name(costume);
                let catalog = catalogs.get(&base).cloned().unwrap_or_default();
                let wanted = used.get(costume).cloned().unwrap_or_default();
                (costume.clone(), prune_catalog(costume, &catalog, &wanted))
            })
            .collect();

        let (mocs, textures) = self.model_asset_phase(&mut queue, &builds).await;
        let (motions, expressions) = self.motion_phase(&mut queue, &pruned).await;
        info!(motions = motions.len(), expressions = expressions.len(), "motions preloaded");

        let mut models = ModelLibrary::new();
        for (costume, build) in builds {
            let base = resolve::motion_base_name(&costume);
            let catalog = pruned.get(&costume).cloned().unwrap_or_default();
            let mut own_textures: Vec<(usize, PreparedImage)> = textures
                .iter()
                .filter(|(c, _, _)| *c == costume)
                .map(|(_, i, img)| (*i, img.clone()))
                .collect();
            own_textures.sort_by_key(|(i, _)| *i);
            let bundle = ModelBundle {
                motions: catalog
                    .motions
                    .iter()
                    .filter_map(|m| Some((m.clone(), *motions.get(&(base.clone(), m.clone()))?)))
                    .collect(),
                expressions: catalog
                    .expressions
                    .iter()
                    .filter_map(|e| {
                        Some((e.clone(), *expressions.get(&(base.clone(), e.clone()))?))
                    })
                    .collect(),
                moc: Arc::new(mocs.get(&costume).cloned().unwrap_or_default()),
                textures: own_textures.into_iter().map(|(_, img)| img).collect(),
                catalog,
                motion_base: base,
                build,
                costume,
            };
            models.insert(bundle);
        }

        Ok(ControllerData {
            story: story.clone(),
            scenario,
            script,
            resources,
            models,
        })
    }

    async fn media_phase(
        &self,
        queue: &mut PreloadQueue<Fetched>,
        story: &StoryRef,
        script: &NormalizedScenario,
    ) -> AssetStore {
        let refs = MediaRefs::collect(script);
        for name in refs.backgrounds {
            let fetch = self.get(&resolve::background_path(&name));
            queue
                .add(name.clone(), async move {
                    let image = decode_image(&fetch.await?)?;
                    Ok(Fetched::Image(AssetKind::Background.key(&name), image))
                })
                .await;
        }
        let sounds = refs
            .bgm
            .into_iter()
            .map(|n| (AssetKind::Bgm.key(&n), resolve::bgm_path(&n)))
            .chain(
                refs.se
                    .into_iter()
                    .map(|(b, n)| (AssetKind::Se.key(&n), resolve::se_path(&b, &n))),
            );
        for (key, path) in sounds {
            let url = self.urls.resolve(&path);
            let fetch = self.fetcher.fetch(&url);
            queue
                .add(key.clone(), async move {
                    let bytes = fetch.await?;
                    Ok(Fetched::Sound(key, PreparedSound { url, bytes: Arc::new(bytes) }))
                })
                .await;
        }
        for voice in refs.voices {
            let path = resolve::voice_path(story, &script.scenario_id, &voice);
            let locator = self.voices.clone();
            let fetcher = self.fetcher.clone();
            let urls = self.urls.clone();
            queue
                .add(voice.clone(), async move {
                    let located = locator.locate(path).await;
                    let url = urls.resolve(&located);
                    let bytes = fetcher.fetch(&url).await?;
                    Ok(Fetched::Sound(
                        AssetKind::Voice.key(&voice),
                        PreparedSound { url, bytes: Arc::new(bytes) },
                    ))
                })
                .await;
        }

        let mut store = AssetStore::new();
        for fetched in queue.all().await.into_iter().flatten() {
            match fetched {
                Fetched::Image(key, img) => store.insert(key, PreparedAsset::Image(img)),
                Fetched::Sound(key, snd) => store.insert(key, PreparedAsset::Sound(snd)),
                _ => {}
            }
        }
        store
    }

    async fn model_data_phase(
        &self,
        queue: &mut PreloadQueue<Fetched>,
        costumes: &[String],
    ) -> (BTreeMap<String, ModelBuildData>, BTreeMap<String, MotionCatalog>) {
        let mut bases = BTreeSet::new();
        for costume in costumes {
            bases.insert(resolve::motion_base_name(costume));
            let fetch = self.get(&resolve::model_build_path(costume));
            let costume = costume.clone();
            queue
                .add(costume.clone(), async move {
                    let build = serde_json::from_slice(&fetch.await?)
                        .map_err(|e| StageError::serde(format!("build data {costume}: {e}")))?;
                    Ok(Fetched::Build(costume, build))
                })
                .await;
        }
        for base in bases {
            let fetch = self.get(&resolve::motion_catalog_path(&base));
            queue
                .add(base.clone(), async move {
                    let catalog = serde_json::from_slice(&fetch.await?)
                        .map_err(|e| StageError::serde(format!("motion catalog {base}: {e}")))?;
                    Ok(Fetched::Catalog(base, catalog))
                })
                .await;
        }

        let mut builds = BTreeMap::new();
        let mut catalogs = BTreeMap::new();
        for fetched in queue.all().await.into_iter().flatten() {
            match fetched {
                Fetched::Build(costume, build) => {
                    builds.insert(costume, build);
                }
                Fetched::Catalog(base, catalog) => {
                    catalogs.insert(base, catalog);
                }
                _ => {}
            }
        }
        for costume in costumes.iter().filter(|c| !builds.contains_key(*c)) {
            warn!(costume = %costume, "model build data missing; model skipped");
        }
        (builds, catalogs)
    }

    async fn model_asset_phase(
        &self,
        queue: &mut PreloadQueue<Fetched>,
        builds: &BTreeMap<String, ModelBuildData>,
    ) -> (BTreeMap<String, Vec<u8>>, Vec<(String, usize, PreparedImage)>) {
        for (costume, build) in builds {
            if !build.moc3_file_name.is_empty() {
                let fetch = self.get(&resolve::model_file_path(costume, &build.moc3_file_name));
                let costume = costume.clone();
                queue
                    .add(build.moc3_file_name.clone(), async move {
                        Ok(Fetched::Moc(costume, fetch.await?))
                    })
                    .await;
            }
            for (index, texture) in build.texture_names.iter().enumerate() {
                let fetch = self.get(&resolve::model_file_path(costume, texture));
                let costume = costume.clone();
                queue
                    .add(texture.clone(), async move {
                        let image = decode_image(&fetch.await?)?;
                        Ok(Fetched::Texture(costume, index, image))
                    })
                    .await;
            }
        }

        let mut mocs = BTreeMap::new();
        let mut textures = Vec::new();
        for fetched in queue.all().await.into_iter().flatten() {
            match fetched {
                Fetched::Moc(costume, bytes) => {
                    mocs.insert(costume, bytes);
                }
                Fetched::Texture(costume, index, image) => textures.push((costume, index, image)),
                _ => {}
            }
        }
        (mocs, textures)
    }

    async fn motion_phase(
        &self,
        queue: &mut PreloadQueue<Fetched>,
        pruned: &BTreeMap<String, MotionCatalog>,
    ) -> (
        BTreeMap<(String, String), MotionClip>,
        BTreeMap<(String, String), ExpressionClip>,
    ) {
        let mut motion_names = BTreeSet::new();
        let mut expression_names = BTreeSet::new();
        for (costume, catalog) in pruned {
            let base = resolve::motion_base_name(costume);
            motion_names.extend(catalog.motions.iter().map(|m| (base.clone(), m.clone())));
            expression_names.extend(catalog.expressions.iter().map(|e| (base.clone(), e.clone())));
        }
        for (base, name) in motion_names {
            let fetch = self.get(&resolve::motion_clip_path(&base, &name));
            queue
                .add(name.clone(), async move {
                    let clip = MotionClip::from_motion3(&fetch.await?)
                        .map_err(|e| StageError::serde(format!("motion {name}: {e}")))?;
                    Ok(Fetched::Motion(base, name, clip))
                })
                .await;
        }
        for (base, name) in expression_names {
            let fetch = self.get(&resolve::expression_path(&base, &name));
            queue
                .add(name.clone(), async move {
                    let clip = ExpressionClip::from_exp3(&fetch.await?)
                        .map_err(|e| StageError::serde(format!("expression {name}: {e}")))?;
                    Ok(Fetched::Expression(base, name, clip))
                })
                .await;
        }

        let mut motions = BTreeMap::new();
        let mut expressions = BTreeMap::new();
        for fetched in queue.all().await.into_iter().flatten() {
            match fetched {
                Fetched::Motion(base, name, clip) => {
                    motions.insert((base, name), clip);
                }
                Fetched::Expression(base, name, clip) => {
                    expressions.insert((base, name), clip);
                }
                _ => {}
            }
        }
        (motions, expressions)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/preloader.rs"]
mod tests;
