use stencil_ir::{Graph, NodeId, NodeTag};
use strum::VariantArray;
use test_case::test_case;

use crate::config::FusionConfig;
use crate::error::Result;
use crate::pattern::{FusionPattern, PatternSet, RewriteResult, Rule};

/// Declines everything; only its benefit matters.
struct Decline(u16);

impl FusionPattern for Decline {
    fn rule(&self) -> Rule {
        Rule::ProducerInlining
    }

    fn benefit(&self) -> u16 {
        self.0
    }

    fn root(&self) -> NodeTag {
        NodeTag::Apply
    }

    fn match_and_rewrite(&self, _graph: &mut Graph, _node: NodeId) -> Result<RewriteResult> {
        Ok(RewriteResult::NoMatch)
    }
}

fn names(set: &PatternSet) -> Vec<&'static str> {
    set.iter().map(|p| p.name()).collect()
}

#[test]
fn test_default_set_is_priority_ordered() {
    let set = PatternSet::default();
    assert_eq!(names(&set), vec!["producer_inlining", "output_rerouting", "root_introduction"]);
    let benefits: Vec<_> = set.iter().map(|p| p.benefit()).collect();
    assert_eq!(benefits, vec![3, 2, 1]);
}

#[test]
fn test_patterns_by_anchor() {
    let set = PatternSet::default();
    let loads: Vec<_> = set.for_tag(NodeTag::Load).map(|p| p.rule()).collect();
    let applies: Vec<_> = set.for_tag(NodeTag::Apply).map(|p| p.rule()).collect();
    assert_eq!(loads, vec![Rule::RootIntroduction]);
    assert_eq!(applies, vec![Rule::ProducerInlining, Rule::OutputRerouting]);
}

#[test_case(FusionConfig::builder().inline(false).build(), &["output_rerouting", "root_introduction"] ; "no inline")]
#[test_case(FusionConfig::builder().reroute(false).build(), &["producer_inlining", "root_introduction"] ; "no reroute")]
#[test_case(FusionConfig::builder().root(false).build(), &["producer_inlining", "output_rerouting"] ; "no root")]
#[test_case(FusionConfig::builder().inline(false).reroute(false).root(false).build(), &[] ; "nothing")]
fn test_from_config(config: FusionConfig, expected: &[&str]) {
    assert_eq!(names(&PatternSet::from_config(&config)), expected);
}

#[test]
fn test_push_keeps_order() {
    let mut set = PatternSet::default();
    set.push(Decline(5));
    set.push(Decline(2));
    set.push(Decline(0));
    let benefits: Vec<_> = set.iter().map(|p| p.benefit()).collect();
    assert_eq!(benefits, vec![5, 3, 2, 2, 1, 0]);
    assert_eq!(set.len(), 6);
}

#[test]
fn test_rule_names() {
    let names: Vec<String> = Rule::VARIANTS.iter().map(|rule| rule.to_string()).collect();
    assert_eq!(names, vec!["root_introduction", "output_rerouting", "producer_inlining"]);
}
