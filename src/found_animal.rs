//! Bundled "found an animal" guidance tree.
//!
//! Walks someone who found an animal in distress toward a recommendation.
//! Shared advice comes from [`crate::macros`]; only the questions and the
//! animal-specific lines are written out here.

use crate::macros::{MacroCall, PromptPart, splice};
use crate::tree::FlowTree;
use crate::types::{FlowNode, FlowOption};
use crate::validate::{ValidTree, ValidateConfig, ValidationError, validate};

const PARENTS_GONE: &str =
    "If you are sure the parents are not nearby, and do not return within a few hours";

const DO_NOT_HANDLE_DEER: &str = "Do not approach or try to handle the deer, as this may scare it and lead to further injury.";

/// The authored tree, as content authors would serialize it.
pub fn bundled() -> FlowNode {
    ask(
        ["What animal have you found in distress?"],
        vec![
            FlowOption::new("Bird", bird()),
            FlowOption::new("Deer/Fawn", deer()),
            FlowOption::new("Cat", cat()),
            FlowOption::new("Squirrel", squirrel()),
            FlowOption::new("Raccoon", raccoon()),
        ],
    )
}

/// The bundled tree, compiled and validated.
pub fn bundled_tree() -> Result<ValidTree, ValidationError> {
    validate(FlowTree::from_flow(&bundled()), &ValidateConfig::default())
}

// ============================================================================
// BUILDING BLOCKS
// ============================================================================

fn ask<P, I>(prompt: I, options: Vec<FlowOption>) -> FlowNode
where
    P: Into<PromptPart>,
    I: IntoIterator<Item = P>,
{
    FlowNode::branching(splice(prompt.into_iter().map(Into::<PromptPart>::into)), options)
}

fn yes_no<P, I>(prompt: I, yes: FlowNode, no: FlowNode) -> FlowNode
where
    P: Into<PromptPart>,
    I: IntoIterator<Item = P>,
{
    ask(
        prompt,
        vec![FlowOption::new("Yes", yes), FlowOption::new("No", no)],
    )
}

fn advise(prompt: Vec<PromptPart>) -> FlowNode {
    FlowNode::terminal(splice(prompt))
}

fn rehab(subject: &str) -> FlowNode {
    advise(vec![MacroCall::rehab(subject).into()])
}

fn rehab_when(subject: &str, condition: &str) -> FlowNode {
    advise(vec![MacroCall::rehab(subject).when(condition).into()])
}

fn leave(subject: &str) -> FlowNode {
    advise(vec![MacroCall::leave(subject).into()])
}

// ============================================================================
// BIRD
// ============================================================================

fn bird() -> FlowNode {
    yes_no(
        [
            "Is the bird injured?",
            "For example, does it look like it may have been attacked, is it bleeding, does it appear malnourished, or a wing is drooping?",
        ],
        rehab("an injured bird"),
        yes_no(["Does the bird have feathers?"], fledgling(), nestling()),
    )
}

fn fledgling() -> FlowNode {
    yes_no(
        [
            "The bird you've found is likely a fledgling.",
            "It is normal for it to be on the ground, it has likely left the nest recently. The parents should still be looking after it and feeding it.",
            "Is the bird safe from pets (dogs, cats, etc.) and people?",
        ],
        leave("the bird"),
        yes_no(
            [
                "Carefully move the bird to a safe location nearby, such as a bush or tree.",
                "Once moved, leave the bird alone, keeping yourself and any pets away from it, and observe from a distance.",
                "Are the parents still nearby?",
            ],
            leave("the bird"),
            rehab_when("the bird", PARENTS_GONE),
        ),
    )
}

fn nestling() -> FlowNode {
    yes_no(
        [
            "The bird you've found is likely a nestling. It shouldn't be on the ground yet!",
            "Can you locate the nest, and is it intact and safe to return the bird to?",
        ],
        yes_no(
            [
                "Carefully return the bird to the nest.",
                "Once returned, leave the bird alone, keeping yourself and any pets away from it, and observe from a distance.",
                "Are the parents still nearby? Are they visiting the nest and showing interest in the bird?",
            ],
            leave("the bird"),
            rehab_when("the bird", PARENTS_GONE),
        ),
        rehab_when(
            "the bird",
            "If you cannot locate a suitable nest, and if you are sure the parents are not nearby, and do not return within a few hours",
        ),
    )
}

// ============================================================================
// DEER / FAWN
// ============================================================================

fn deer() -> FlowNode {
    yes_no(
        [
            "Is the deer injured?",
            "For example, does it look like it may have been attacked, is it bleeding, is it unable to walk?",
        ],
        advise(vec![
            DO_NOT_HANDLE_DEER.into(),
            MacroCall::rehab("an injured deer").into(),
        ]),
        yes_no(
            [
                "Is the deer trapped or stuck?",
                "For example, is it stuck in a fence, or in a hole?",
            ],
            advise(vec![
                DO_NOT_HANDLE_DEER.into(),
                MacroCall::rehab("a trapped deer").into(),
            ]),
            yes_no(
                ["Is the deer alone?"],
                advise(vec![
                    "This is normal, do not worry. Younger deer (fawns) are often left alone for long periods of time. The mother should return to feed them, often toward the end of the day.".into(),
                    "If you are still concerned, you can monitor the deer from a distance to make sure the mother is still caring for it. Do not approach or try to handle the deer, as your scent may lead to the mother abandoning it.".into(),
                    MacroCall::rehab("a deer")
                        .when("If you don't see the mother return over the next couple of days")
                        .into(),
                ]),
                leave("the deer"),
            ),
        ),
    )
}

// ============================================================================
// CAT
// ============================================================================

fn cat() -> FlowNode {
    yes_no(
        [
            "Does the cat appear to be sick, injured, in danger, or a nursing kitten with no mama in sight?",
            "For example, is the cat is lying down and will not get up, is limping, or has blood anywhere on their body.",
        ],
        rehab("the cat"),
        yes_no(
            ["Has the cat been outside for over 24 hours?"],
            advise(vec![
                "Check for a collar, if the cat has one try and get in contact with the owner. If the cat has no collar, you can take the cat to the nearest animal shelter to check for a microchip.".into(),
                "If the cat does not have a microchip, leave the cat where it is. You can attempt to locate the owner by asking neighbours, or leaving out flyers with photos and detailed information about the cat.".into(),
                MacroCall::rehab("the cat")
                    .when("If the cat appears to be feral/unowned")
                    .into(),
            ]),
            leave("the cat"),
        ),
    )
}

// ============================================================================
// SQUIRREL
// ============================================================================

fn squirrel() -> FlowNode {
    yes_no(
        [
            "Does any of the following apply to the squirrel?",
            "- It is bleeding, has an open wound, or has a broken bone.",
            "- It has been in a cat's or dog's mouth.",
            "- It is covered in fly eggs (looks like small grains of rice).",
            "- It is cold, wet, or crying nonstop.",
        ],
        rehab("the squirrel"),
        yes_no(
            [
                "Does the squirrel have a fluffed-out tail, a body longer than 6 inches (excluding the tail), or is approaching humans/pets?",
            ],
            advise(vec![
                "This is likely a juvenile squirrel, you do not need to intervene.".into(),
                MacroCall::leave("the squirrel").into(),
            ]),
            yes_no(
                ["Is the squirrel alone?"],
                rehab_when("the squirrel", PARENTS_GONE),
                leave("the squirrel"),
            ),
        ),
    )
}

// ============================================================================
// RACCOON
// ============================================================================

fn raccoon() -> FlowNode {
    yes_no(
        ["Does the raccoon appear to be sick or injured?"],
        rehab("the raccoon"),
        yes_no(
            ["Have you found a baby raccoon that's alone with no mother in sight?"],
            advise(vec![
                "Be careful not to create an orphan raccoon accidentally. When a baby raccoon is separated from its mother, it will stay where it is until the mother returns.".into(),
                "Monitor the baby from a distance to make sure the mother is still caring for it. Do not attempt to feed or otherwise care for the baby, as this may lead to it becoming dependent on humans.".into(),
                MacroCall::rehab("the baby raccoon")
                    .when("If the mother does return after 24 hours")
                    .into(),
            ]),
            leave("the raccoon"),
        ),
    )
}

// ============================================================================
// TESTS
// ============================================================================
