// Console command grammar: one command per input line.

use std::fmt;

use crate::domain::PostId;

pub const HELP: &str = "\
commands:
  signup <email> <password> <nickname>   create an account
  login <email> <password>               log in and remember the session
  logout                                 forget the session
  feed                                   reload the feed from the first page
  more                                   load the next page
  show <id>                              fetch one post
  author <name>                          set the author for new posts
  type <text>                            set the post text (analyzed as you go)
  tag <hashtag>                          append a suggested hashtag
  post                                   publish the current text
  edit <id> <text>                       replace a post's text
  delete <id>                            delete a post
  analyze <id>                           analyze an existing post
  status                                 show session, form and feed state
  help                                   show this message
  quit                                   exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SignUp {
        email: String,
        password: String,
        nickname: String,
    },
    LogIn {
        email: String,
        password: String,
    },
    LogOut,
    Feed,
    More,
    Show(PostId),
    Author(String),
    Type(String),
    Tag(String),
    Post,
    Edit {
        id: PostId,
        content: String,
    },
    Delete(PostId),
    Analyze(PostId),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    Usage(&'static str),
    InvalidId(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::Unknown(name) => write!(f, "unknown command `{name}`, try `help`"),
            ParseError::Usage(usage) => write!(f, "usage: {usage}"),
            ParseError::InvalidId(raw) => write!(f, "`{raw}` is not a post id"),
        }
    }
}

impl std::error::Error for ParseError {}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "signup" => match words(rest)[..] {
            [email, password, nickname] => Ok(Command::SignUp {
                email: email.to_string(),
                password: password.to_string(),
                nickname: nickname.to_string(),
            }),
            _ => Err(ParseError::Usage("signup <email> <password> <nickname>")),
        },
        "login" => match words(rest)[..] {
            [email, password] => Ok(Command::LogIn {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err(ParseError::Usage("login <email> <password>")),
        },
        "logout" => Ok(Command::LogOut),
        "feed" => Ok(Command::Feed),
        "more" => Ok(Command::More),
        "show" => post_id(rest, "show <id>").map(Command::Show),
        "author" => required(rest, "author <name>").map(Command::Author),
        // Text may legitimately be empty or short: it clears the analysis.
        "type" => Ok(Command::Type(rest.to_string())),
        "tag" => required(rest, "tag <hashtag>").map(Command::Tag),
        "post" => Ok(Command::Post),
        "edit" => {
            let (id, content) = rest
                .split_once(char::is_whitespace)
                .ok_or(ParseError::Usage("edit <id> <text>"))?;
            Ok(Command::Edit {
                id: post_id(id, "edit <id> <text>")?,
                content: content.trim().to_string(),
            })
        }
        "delete" => post_id(rest, "delete <id>").map(Command::Delete),
        "analyze" => post_id(rest, "analyze <id>").map(Command::Analyze),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => Err(ParseError::Unknown(name.to_string())),
    }
}

fn words(rest: &str) -> Vec<&str> {
    rest.split_whitespace().collect()
}

fn required(rest: &str, usage: &'static str) -> Result<String, ParseError> {
    if rest.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    Ok(rest.to_string())
}

fn post_id(raw: &str, usage: &'static str) -> Result<PostId, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    raw.parse::<PostId>()
        .map_err(|_| ParseError::InvalidId(raw.to_string()))
}
