//! Conversion between [`Scope`] values and query-string parameters.
//!
//! Decoding is total: malformed or partial parameters never produce an
//! error, they decode to `None` ("no explicit scope in the URL"), which is
//! distinct from a decoded [`Scope::None`].

use crate::params::SearchParams;
use crate::scope::Scope;
use crate::scope::ScopeKind;

pub const SCOPE_PARAM: &str = "scope";
pub const DEAL_ID_PARAM: &str = "deal_id";
pub const SO_ID_PARAM: &str = "so_id";
pub const PO_ID_PARAM: &str = "po_id";
pub const CONTRACT_ID_PARAM: &str = "contract_id";

/// Every key owned by the scope codec.
pub const SCOPE_PARAMS: [&str; 5] = [
    SCOPE_PARAM,
    DEAL_ID_PARAM,
    SO_ID_PARAM,
    PO_ID_PARAM,
    CONTRACT_ID_PARAM,
];

/// Stable string identity of a scope, e.g. `deal:42` or `so:7`.
///
/// Child scopes are keyed by their leaf id only, so `so:7` under two
/// different deals yields the same key. Callers rely on leaf ids being
/// unique per kind.
pub fn scope_key(scope: &Scope) -> String {
    match scope {
        Scope::None => "none".to_string(),
        Scope::All => "all".to_string(),
        Scope::Deal { deal_id } => format!("deal:{deal_id}"),
        Scope::So { so_id, .. } => format!("so:{so_id}"),
        Scope::Po { po_id, .. } => format!("po:{po_id}"),
        Scope::Contract { contract_id, .. } => format!("contract:{contract_id}"),
    }
}

/// Structural equality: same variant and same field values.
pub fn is_same_scope(a: &Scope, b: &Scope) -> bool {
    a == b
}

/// Decode the scope carried by `params`.
///
/// Returns `None` when the `scope` key is absent, names an unknown kind, or
/// a required companion id is missing or not an integer.
pub fn scope_from_search_params(params: &SearchParams) -> Option<Scope> {
    let kind: ScopeKind = params.get(SCOPE_PARAM)?.trim().parse().ok()?;
    let scope = match kind {
        ScopeKind::None => Scope::None,
        ScopeKind::All => Scope::All,
        ScopeKind::Deal => Scope::Deal {
            deal_id: id_param(params, DEAL_ID_PARAM)?,
        },
        ScopeKind::So => Scope::So {
            deal_id: id_param(params, DEAL_ID_PARAM)?,
            so_id: id_param(params, SO_ID_PARAM)?,
        },
        ScopeKind::Po => Scope::Po {
            deal_id: id_param(params, DEAL_ID_PARAM)?,
            po_id: id_param(params, PO_ID_PARAM)?,
        },
        ScopeKind::Contract => {
            let deal_id = id_param(params, DEAL_ID_PARAM)?;
            Scope::contract(deal_id, params.get(CONTRACT_ID_PARAM)?).ok()?
        }
    };
    Some(scope)
}

/// Return a copy of `params` with the scope keys rewritten for `scope`.
///
/// Unrelated keys keep their order; scope keys are appended after them.
/// [`Scope::None`] writes nothing.
pub fn write_scope_to_search_params(params: &SearchParams, scope: &Scope) -> SearchParams {
    let mut next = params.clone();
    for key in SCOPE_PARAMS {
        next.delete(key);
    }
    if matches!(scope, Scope::None) {
        return next;
    }

    next.append(SCOPE_PARAM, scope.kind().as_ref());
    match scope {
        Scope::None | Scope::All => {}
        Scope::Deal { deal_id } => {
            next.append(DEAL_ID_PARAM, deal_id.to_string());
        }
        Scope::So { deal_id, so_id } => {
            next.append(DEAL_ID_PARAM, deal_id.to_string());
            next.append(SO_ID_PARAM, so_id.to_string());
        }
        Scope::Po { deal_id, po_id } => {
            next.append(DEAL_ID_PARAM, deal_id.to_string());
            next.append(PO_ID_PARAM, po_id.to_string());
        }
        Scope::Contract {
            deal_id,
            contract_id,
        } => {
            next.append(DEAL_ID_PARAM, deal_id.to_string());
            next.append(CONTRACT_ID_PARAM, contract_id.as_str());
        }
    }
    next
}

/// Decode a raw query string (leading `?` allowed).
pub fn scope_from_query(query: &str) -> Option<Scope> {
    scope_from_search_params(&SearchParams::parse(query))
}

/// Rewrite the scope keys of a raw query string and serialize the result.
pub fn scope_to_query(query: &str, scope: &Scope) -> String {
    write_scope_to_search_params(&SearchParams::parse(query), scope).to_query_string()
}

/// Deal id from an old-style link: a bare `deal_id` with no `scope` key.
pub fn legacy_deal_id(params: &SearchParams) -> Option<i64> {
    if params.has(SCOPE_PARAM) {
        return None;
    }
    parse_id(params.get(DEAL_ID_PARAM)?)
}

/// Parse an id that must be a finite, integer-valued number.
///
/// Plain integers are accepted as-is. Decimal or exponent notation is
/// accepted only when the value has no fractional part and fits in `i64`
/// (`7.0`, `1e2`). Anything else, including the empty string, is rejected.
pub fn parse_id(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(id) = raw.parse::<i64>() {
        return Some(id);
    }

    let value: f64 = raw.parse().ok()?;
    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    if !value.is_finite()
        || value.fract() != 0.0
        || value < i64::MIN as f64
        || value >= i64::MAX as f64
    {
        return None;
    }
    Some(value as i64)
}

fn id_param(params: &SearchParams, key: &str) -> Option<i64> {
    parse_id(params.get(key)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn all_variants() -> Vec<Scope> {
        vec![
            Scope::None,
            Scope::All,
            Scope::Deal { deal_id: 42 },
            Scope::So {
                deal_id: 42,
                so_id: 7,
            },
            Scope::Po {
                deal_id: 42,
                po_id: 9,
            },
            Scope::Contract {
                deal_id: 42,
                contract_id: "HC-2024/17".to_string(),
            },
        ]
    }

    #[test]
    fn decodes_what_it_writes() {
        for scope in all_variants() {
            let written = write_scope_to_search_params(&SearchParams::new(), &scope);
            let decoded = scope_from_search_params(&written);
            if scope == Scope::None {
                assert_eq!(decoded, None, "none leaves no marker");
            } else {
                assert_eq!(decoded, Some(scope));
            }
        }
    }

    #[test]
    fn writes_only_the_keys_a_variant_needs() {
        let params = SearchParams::new();
        assert_eq!(
            write_scope_to_search_params(&params, &Scope::None).to_query_string(),
            ""
        );
        assert_eq!(
            write_scope_to_search_params(&params, &Scope::All).to_query_string(),
            "scope=all"
        );
        assert_eq!(
            write_scope_to_search_params(&params, &Scope::Deal { deal_id: 5 }).to_query_string(),
            "scope=deal&deal_id=5"
        );
        assert_eq!(
            write_scope_to_search_params(
                &params,
                &Scope::Po {
                    deal_id: 5,
                    po_id: 11
                }
            )
            .to_query_string(),
            "scope=po&deal_id=5&po_id=11"
        );
    }

    #[test]
    fn write_replaces_stale_keys_and_keeps_others() {
        let params = SearchParams::parse("tab=hedges&scope=so&deal_id=1&so_id=2&page=3");
        let next = write_scope_to_search_params(&params, &Scope::Deal { deal_id: 8 });

        assert_eq!(next.to_query_string(), "tab=hedges&page=3&scope=deal&deal_id=8");
        // Input untouched.
        assert_eq!(params.get("so_id"), Some("2"));
    }

    #[test]
    fn decode_rejects_unknown_or_incomplete_scopes() {
        assert_eq!(scope_from_query("scope=bogus"), None);
        assert_eq!(scope_from_query("scope=so&deal_id=4"), None);
        assert_eq!(scope_from_query("scope=deal"), None);
        assert_eq!(scope_from_query("scope=contract&deal_id=4"), None);
        assert_eq!(scope_from_query("scope=contract&deal_id=4&contract_id="), None);
        assert_eq!(scope_from_query("deal_id=4"), None);
        assert_eq!(scope_from_query(""), None);
    }

    #[test]
    fn decode_reads_kind_case_insensitively() {
        assert_eq!(
            scope_from_query("?scope=DEAL&deal_id=3"),
            Some(Scope::Deal { deal_id: 3 })
        );
        assert_eq!(scope_from_query("scope=None"), Some(Scope::None));
        assert_eq!(scope_from_query("scope=All"), Some(Scope::All));
    }

    #[test]
    fn decode_rejects_non_integer_ids() {
        assert_eq!(scope_from_query("scope=deal&deal_id=1.5"), None);
        assert_eq!(scope_from_query("scope=deal&deal_id=abc"), None);
        assert_eq!(scope_from_query("scope=deal&deal_id=Infinity"), None);
        assert_eq!(scope_from_query("scope=deal&deal_id=NaN"), None);
        assert_eq!(scope_from_query("scope=po&deal_id=1&po_id=2x"), None);
    }

    #[test]
    fn parse_id_accepts_integer_valued_numbers() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id(" 42 "), Some(42));
        assert_eq!(parse_id("-3"), Some(-3));
        assert_eq!(parse_id("7.0"), Some(7));
        assert_eq!(parse_id("1e2"), Some(100));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("   "), None);
        assert_eq!(parse_id("0.5"), None);
        assert_eq!(parse_id("1e300"), None);
        assert_eq!(parse_id("inf"), None);
    }

    #[test]
    fn legacy_deal_id_requires_missing_scope_key() {
        assert_eq!(legacy_deal_id(&SearchParams::parse("deal_id=7")), Some(7));
        assert_eq!(legacy_deal_id(&SearchParams::parse("deal_id=7&scope=bogus")), None);
        assert_eq!(legacy_deal_id(&SearchParams::parse("deal_id=x")), None);
        assert_eq!(legacy_deal_id(&SearchParams::parse("tab=1")), None);
    }

    #[test]
    fn same_scope_is_reflexive_symmetric_and_matches_keys() {
        let scopes = all_variants();
        for a in &scopes {
            assert!(is_same_scope(a, a));
            for b in &scopes {
                assert_eq!(is_same_scope(a, b), is_same_scope(b, a));
                if is_same_scope(a, b) {
                    assert_eq!(scope_key(a), scope_key(b));
                }
            }
        }
    }

    #[test]
    fn scope_key_uses_leaf_id_only() {
        assert_eq!(scope_key(&Scope::Deal { deal_id: 42 }), "deal:42");
        let first = Scope::So {
            deal_id: 1,
            so_id: 7,
        };
        let second = Scope::So {
            deal_id: 2,
            so_id: 7,
        };
        assert_eq!(scope_key(&first), "so:7");
        assert_eq!(scope_key(&first), scope_key(&second));
        assert!(!is_same_scope(&first, &second));
    }

    #[test]
    fn scope_to_query_round_trips_through_strings() {
        let query = scope_to_query("?view=pnl", &Scope::contract(3, "K 1").unwrap_or_default());
        assert_eq!(query, "view=pnl&scope=contract&deal_id=3&contract_id=K+1");
        assert_eq!(
            scope_from_query(&query),
            Some(Scope::Contract {
                deal_id: 3,
                contract_id: "K 1".to_string()
            })
        );
    }
}
