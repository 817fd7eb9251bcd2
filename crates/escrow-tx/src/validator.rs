use anyhow::{Context, anyhow};
use cardano_tx_builder::{Address, Credential, Hash, NetworkId, PlutusScript, PlutusVersion};
use serde::Deserialize;
use std::{fs, path::Path};
use uplc::ast::{DeBruijn, Program};

/// A compiled validator, as found in a blueprint, before any parameter is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorArtifact {
    pub title: String,
    pub script: PlutusScript,
}

/// A validator ready for use on a given network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScript {
    pub script: PlutusScript,
    pub hash: Hash<28>,
    pub address: Address,
}

#[derive(Debug, Deserialize)]
struct Blueprint {
    #[serde(default)]
    preamble: Preamble,
    validators: Vec<BlueprintValidator>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Preamble {
    plutus_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlueprintValidator {
    title: String,
    compiled_code: String,
}

impl ValidatorArtifact {
    /// Pick a validator out of a CIP-57 blueprint: the one named `title` if any, the first
    /// one otherwise. Multi-purpose validators may be named without their purpose suffix.
    pub fn from_blueprint(blueprint: &str, title: Option<&str>) -> anyhow::Result<Self> {
        let blueprint: Blueprint =
            serde_json::from_str(blueprint).context("failed to parse blueprint")?;

        let version = match blueprint.preamble.plutus_version {
            Some(version) => version.parse()?,
            None => PlutusVersion::default(),
        };

        let validator = match title {
            None => blueprint.validators.into_iter().next(),
            Some(title) => blueprint.validators.into_iter().find(|validator| {
                validator.title == title || validator.title.starts_with(&format!("{title}."))
            }),
        }
        .ok_or_else(|| match title {
            Some(title) => anyhow!("no validator titled '{title}' in blueprint"),
            None => anyhow!("no validators in blueprint"),
        })?;

        let bytes = hex::decode(&validator.compiled_code)
            .with_context(|| format!("malformed compiled code for '{}'", validator.title))?;

        Ok(Self {
            title: validator.title,
            script: PlutusScript::new(version, bytes),
        })
    }

    pub fn from_blueprint_file(path: &Path, title: Option<&str>) -> anyhow::Result<Self> {
        let blueprint = fs::read_to_string(path)
            .with_context(|| format!("failed to read blueprint at {}", path.display()))?;
        Self::from_blueprint(&blueprint, title)
    }
}

/// Apply parameters to the validator and derive its hash and enterprise address. The network
/// tag is whatever the caller says it is; nothing here looks at the environment.
pub fn resolve(
    artifact: &ValidatorArtifact,
    params: &[String],
    network_id: NetworkId,
) -> anyhow::Result<ResolvedScript> {
    let params = params
        .iter()
        .map(|param| {
            hex::decode(param.trim()).with_context(|| format!("malformed parameter '{param}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let script = PlutusScript::new(
        artifact.script.version(),
        apply_params(artifact.script.as_bytes(), &params)?,
    );

    let hash = script.hash();
    let address = Address::enterprise(network_id, Credential::Script(hash));

    Ok(ResolvedScript {
        script,
        hash,
        address,
    })
}

/// Each parameter goes in as a bytestring, in order. Without parameters, the code is returned
/// untouched.
fn apply_params(code: &[u8], params: &[Vec<u8>]) -> anyhow::Result<Vec<u8>> {
    if params.is_empty() {
        return Ok(code.to_vec());
    }

    let mut buffer = Vec::new();
    let mut program = Program::<DeBruijn>::from_cbor(code, &mut buffer)
        .map_err(|e| anyhow!("{e}"))
        .context("failed to decode compiled code")?;

    for param in params {
        program = program.apply_data(uplc::PlutusData::BoundedBytes(param.clone().into()));
    }

    program
        .to_cbor()
        .map_err(|e| anyhow!("{e}"))
        .context("failed to re-encode compiled code")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALWAYS_SUCCEED: &str = "5101010023259800a518a4d136564004ae69";

    fn blueprint(plutus_version: Option<&str>) -> String {
        let preamble = plutus_version
            .map(|version| format!(r#""preamble": {{ "title": "escrow", "plutusVersion": "{version}" }},"#))
            .unwrap_or_default();
        format!(
            r#"{{
                {preamble}
                "validators": [
                    {{ "title": "escrow.escrow.spend", "compiledCode": "{ALWAYS_SUCCEED}", "hash": "bd3ae991b5aafccafe5ca70758bd36a9b2f872f57f6d3a1ffa0eb777" }},
                    {{ "title": "escrow.escrow.else", "compiledCode": "{ALWAYS_SUCCEED}" }}
                ]
            }}"#
        )
    }

    #[test]
    fn resolve_always_succeed() {
        let artifact = ValidatorArtifact::from_blueprint(&blueprint(Some("v3")), None).unwrap();
        assert_eq!(artifact.title, "escrow.escrow.spend");
        assert_eq!(artifact.script.version(), PlutusVersion::V3);

        let resolved = resolve(&artifact, &[], NetworkId::Testnet).unwrap();
        assert_eq!(hex::encode(resolved.script.as_bytes()), ALWAYS_SUCCEED);
        assert_eq!(
            resolved.hash.to_string(),
            "bd3ae991b5aafccafe5ca70758bd36a9b2f872f57f6d3a1ffa0eb777"
        );
        assert_eq!(
            resolved.address.to_string(),
            "addr_test1wz7n46v3kk40ejh7tjnswk9ax65m97rj74lk6wsllg8twac0ke9dm"
        );
    }

    #[test]
    fn resolve_is_pure() {
        let artifact = ValidatorArtifact::from_blueprint(&blueprint(None), None).unwrap();
        assert_eq!(
            resolve(&artifact, &[], NetworkId::Testnet).unwrap(),
            resolve(&artifact, &[], NetworkId::Testnet).unwrap()
        );
    }

    #[test]
    fn network_tag_drives_the_address() {
        let artifact = ValidatorArtifact::from_blueprint(&blueprint(None), None).unwrap();
        let testnet = resolve(&artifact, &[], NetworkId::Testnet).unwrap();
        let mainnet = resolve(&artifact, &[], NetworkId::Mainnet).unwrap();
        assert_eq!(testnet.hash, mainnet.hash);
        assert_eq!(
            mainnet.address.to_string(),
            "addr1wx7n46v3kk40ejh7tjnswk9ax65m97rj74lk6wsllg8twac57dez7"
        );
    }

    #[test]
    fn missing_version_defaults_to_v3() {
        let artifact = ValidatorArtifact::from_blueprint(&blueprint(None), None).unwrap();
        assert_eq!(artifact.script.version(), PlutusVersion::V3);
    }

    #[test]
    fn select_by_title() {
        let artifact =
            ValidatorArtifact::from_blueprint(&blueprint(Some("v3")), Some("escrow.escrow.else"))
                .unwrap();
        assert_eq!(artifact.title, "escrow.escrow.else");

        let artifact =
            ValidatorArtifact::from_blueprint(&blueprint(Some("v3")), Some("escrow.escrow"))
                .unwrap();
        assert_eq!(artifact.title, "escrow.escrow.spend");

        assert!(
            ValidatorArtifact::from_blueprint(&blueprint(Some("v3")), Some("nope")).is_err()
        );
    }

    #[test]
    fn parameters_change_the_script() {
        let artifact = ValidatorArtifact::from_blueprint(&blueprint(None), None).unwrap();
        let params = ["deadbeef".to_string()];

        let plain = resolve(&artifact, &[], NetworkId::Testnet).unwrap();
        let applied = resolve(&artifact, &params, NetworkId::Testnet).unwrap();

        assert_eq!(applied, resolve(&artifact, &params, NetworkId::Testnet).unwrap());
        assert_eq!(applied.script.version(), PlutusVersion::V3);
        assert_ne!(applied.script, plain.script);
        assert_ne!(applied.hash, plain.hash);
        assert_ne!(applied.address, plain.address);
        assert_eq!(applied.hash, applied.script.hash());
    }

    #[test]
    fn malformed_parameters() {
        let artifact = ValidatorArtifact::from_blueprint(&blueprint(None), None).unwrap();
        assert!(resolve(&artifact, &["zz".to_string()], NetworkId::Testnet).is_err());
    }
}
