//! User-visible notice texts.
//!
//! Every line sent to a session that is not a chat message is built here.

use crate::domain::{DisplayName, RoomName};

pub struct NoticeFormatter;

impl NoticeFormatter {
    /// Greeting sent right after a connection is admitted; ends in the name prompt.
    pub fn greeting() -> &'static str {
        "Welcome to TCP-Chat!\n[ENTER YOUR NAME]: "
    }

    pub fn capacity_exceeded() -> &'static str {
        "Chatroom is at max capacity. Try later...\n"
    }

    pub fn invalid_name() -> &'static str {
        "Enter a valid name. Disconnecting...\n"
    }

    pub fn welcome(name: &DisplayName) -> String {
        format!("Welcome, {}!\nUse /help for more options.\n", name)
    }

    pub fn help() -> &'static str {
        "\nAvailable commands:\n\
         /name [new-name]: Change your name\n\
         /users: See who's in the chat\n\
         /help: Display this log of available commands\n\
         /quit: Leave the chat\n\
         /join [room-name]: Join a specific room\n\
         /leave: Leave your current room\n\
         /rooms: List all available rooms\n\
         /rooms [room-name]: List members in a specific room\n\n"
    }

    pub fn farewell() -> &'static str {
        "\nExiting the chat...\n"
    }

    pub fn you_joined(room: &RoomName) -> String {
        format!("You have joined: {}\n", room)
    }

    pub fn already_in_room(room: &str) -> String {
        format!("You are already in room: {}\n", room)
    }

    pub fn member_joined(name: &DisplayName) -> String {
        format!("{} has joined the room!\n", name)
    }

    pub fn you_left(room: &RoomName) -> String {
        format!("You have left the room: {}\n", room)
    }

    pub fn member_left(name: &DisplayName) -> String {
        format!("{} has left the room!\n", name)
    }

    pub fn not_in_room() -> &'static str {
        "You are not in a room. Use /join [room-name] to join one.\n"
    }

    pub fn join_usage() -> &'static str {
        "Usage: /join [room-name]\n"
    }

    pub fn name_usage() -> &'static str {
        "Enter new name after /name\n"
    }

    pub fn renamed(old: &DisplayName, new: &DisplayName) -> String {
        format!("{} is now {}\n", old, new)
    }

    pub fn rename_confirmed(new: &DisplayName) -> String {
        format!("\nSuccess! You are now {}\n\n", new)
    }

    pub fn user_list(names: &[DisplayName]) -> String {
        let mut output = String::from("\nBuddies currently in the chat:\n");
        for name in names {
            output.push_str(name.as_str());
            output.push('\n');
        }
        output
    }

    pub fn room_list(rooms: &[RoomName]) -> String {
        if rooms.is_empty() {
            return "available rooms: (none)\n".to_string();
        }
        let names: Vec<&str> = rooms.iter().map(RoomName::as_str).collect();
        format!("available rooms: {}\n", names.join(", "))
    }

    pub fn member_list(room: &RoomName, members: &[DisplayName]) -> String {
        let names: Vec<&str> = members.iter().map(DisplayName::as_str).collect();
        format!("Members in {}: {}\n", room, names.join(", "))
    }

    pub fn room_not_found(room: &str) -> String {
        format!("Room {} does not exist.\n", room)
    }
}
