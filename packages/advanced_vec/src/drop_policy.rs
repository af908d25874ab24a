/// What a [`Vector`][crate::Vector] may do with elements it still holds when it is dropped.
///
/// The policy only concerns the drop of the vector itself. Elements that leave the vector before
/// then are never affected: values returned by `pop()` or `remove()`, contents handed over by
/// `take()` or `move_from()`, and contents consumed through `into_iter()` all belong to someone
/// else by the time the vector goes away. Consuming a vector into an iterator leaves nothing
/// behind for the policy to check, so the iterator drops any elements it did not yield.
///
/// # Examples
///
/// ```
/// use advanced_vec::{DropPolicy, Vector};
///
/// let mut pending = Vector::<String>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
///
/// pending.push_back("job".to_string());
///
/// // Every element has to be handed off before `pending` may be dropped.
/// while let Some(job) = pending.pop() {
///     assert_eq!(job, "job");
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// Remaining elements are dropped along with the vector.
    #[default]
    MayDropItems,

    /// Dropping a vector that still holds elements is a bug in the owner and panics.
    ///
    /// The remaining elements are dropped and the block released before the panic is raised, so
    /// nothing leaks. The vector returned by `take()` inherits this policy. A vector filled by
    /// `move_from()` keeps its own policy and drops the contents it replaced without checking.
    MustNotDropItems,
}
