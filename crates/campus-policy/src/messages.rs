//! Notification text.

use campus_core::notification::Notification;

pub fn friend_request(requester: &str) -> Notification {
  Notification::new("new friend request!", format!("{requester} sent you a friend request"))
}

pub fn new_friend(friend: &str) -> Notification {
  Notification::new("new friend!", format!("you and {friend} are now friends"))
}

pub fn popular_post(author: &str, likes: u32) -> Notification {
  Notification::new("this post is roasting 🔥", format!("{author}'s post just hit {likes} likes"))
}

pub fn like(liker: &str) -> Notification {
  Notification::new("new like!", format!("{liker} liked your post"))
}

pub fn new_post(author: &str) -> Notification {
  Notification::new("new post!", format!("{author} just posted"))
}

/// The comment text is delivered verbatim.
pub fn comment(commenter: &str, text: &str) -> Notification {
  Notification::new(format!("{commenter} commented on your post"), text)
}

pub fn reply(replier: &str, text: &str) -> Notification {
  Notification::new(format!("{replier} replied to your comment"), text)
}
